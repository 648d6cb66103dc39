//! Response body schema validation.

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::errors::SchemaError;

const DCR32_REGISTRATION_RESPONSE: &str = include_str!("schemas/dcr32_registration_response.json");

pub trait SchemaValidator: Send + Sync {
    /// Validate a raw response body, collecting every violation.
    fn validate(&self, body: &[u8]) -> Result<(), SchemaError>;
}

/// Validator backed by a compiled JSON schema document.
pub struct JsonSchemaValidator {
    validator: Validator,
}

impl JsonSchemaValidator {
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|err| SchemaError::CompilationFailed(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Validator for DCR 3.2 registration responses.
    pub fn dcr32() -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(DCR32_REGISTRATION_RESPONSE)
            .map_err(|err| SchemaError::CompilationFailed(err.to_string()))?;
        Self::new(&schema)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, body: &[u8]) -> Result<(), SchemaError> {
        let instance: Value =
            serde_json::from_slice(body).map_err(|err| SchemaError::InvalidJson(err.to_string()))?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|err| err.to_string())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Violations(violations))
        }
    }
}
