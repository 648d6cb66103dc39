//! Report sinks for manifest results.

use std::io::Write;
use std::path::PathBuf;

use super::manifest::ManifestResult;
use crate::errors::ReportError;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub trait Reporter {
    fn report(&mut self, result: &ManifestResult) -> Result<(), ReportError>;
}

/// Human readable report, optionally coloured with ANSI escapes.
pub struct TextReporter<W: Write> {
    out: W,
    verbose: bool,
    colour: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            verbose: false,
            colour: false,
        }
    }

    /// Include diagnostic step output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn colour(mut self, colour: bool) -> Self {
        self.colour = colour;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colour {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn verdict(&self, pass: bool) -> String {
        if pass {
            self.paint(GREEN, "PASS")
        } else {
            self.paint(RED, "FAIL")
        }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, result: &ManifestResult) -> Result<(), ReportError> {
        let header = self.paint(BOLD, &format!("{} ({})", result.name, result.version));
        writeln!(self.out, "{}", header)?;

        for scenario in &result.scenarios {
            let verdict = self.verdict(scenario.pass);
            writeln!(self.out, "=== {} {}: {}", verdict, scenario.id, scenario.name)?;
            if !scenario.spec_link.is_empty() {
                writeln!(self.out, "    Reference: {}", scenario.spec_link)?;
            }

            for test_case in &scenario.test_cases {
                let verdict = self.verdict(test_case.pass);
                writeln!(self.out, "    {} {}", verdict, test_case.name)?;

                for step in &test_case.results {
                    let verdict = self.verdict(step.pass);
                    match &step.fail_reason {
                        Some(reason) => {
                            writeln!(self.out, "        {} {}: {}", verdict, step.name, reason)?
                        }
                        None => writeln!(self.out, "        {} {}", verdict, step.name)?,
                    }
                    if self.verbose {
                        for line in &step.debug {
                            writeln!(self.out, "            {}", line)?;
                        }
                    }
                }
            }
        }

        let verdict = if result.pass {
            self.paint(GREEN, "All tests are PASSING")
        } else {
            self.paint(RED, "FAILED")
        };
        writeln!(self.out, "{}", verdict)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the whole result as pretty printed JSON.
pub struct JsonReporter {
    path: PathBuf,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Reporter for JsonReporter {
    fn report(&mut self, result: &ManifestResult) -> Result<(), ReportError> {
        let contents = serde_json::to_vec_pretty(result)?;
        std::fs::write(&self.path, contents)?;
        tracing::info!(path = %self.path.display(), "wrote json report");
        Ok(())
    }
}
