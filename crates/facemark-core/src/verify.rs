//! The external verification capability.
//!
//! The harness never detects or embeds faces itself; it calls out to a
//! collaborator that compares two images and answers with a boolean match
//! decision plus a distance score. [`CommandVerifier`] is the shipped
//! implementation: it spawns a configured command per pair and reads a
//! one-line JSON verdict from stdout.

use crate::types::Combination;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Maximum bytes of subprocess output quoted in error messages.
const OUTPUT_SNIPPET_LIMIT: usize = 200;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("invalid verification command line: {0}")]
    InvalidCommand(String),
    #[error("failed to launch verification command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("verification backend error: {0}")]
    Backend(String),
    #[error("unparsable verification output: {0}")]
    BadOutput(String),
    #[error("backend initialization failed for {combination}: {message}")]
    Init {
        combination: String,
        message: String,
    },
}

/// Outcome of one verification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    pub verified: bool,
    pub distance: f64,
}

/// Black-box comparison of two images under one detector/model combination.
///
/// Detection enforcement is always disabled on the far side: a face the
/// detector cannot find degrades to a best-effort comparison instead of an
/// error, so only unreadable images and backend faults surface here.
pub trait Verifier {
    /// Called once before a combination's pair loop. An error here means the
    /// backend cannot run for this combination at all and fails the whole
    /// combination, not a single pair.
    fn prepare(&mut self, _combination: &Combination) -> Result<(), VerifyError> {
        Ok(())
    }

    /// Compare two images, returning the match decision and distance.
    fn verify(
        &mut self,
        image_a: &Path,
        image_b: &Path,
        combination: &Combination,
    ) -> Result<Verification, VerifyError>;
}

/// JSON verdict printed by the external command: either a result or an
/// error, never both.
#[derive(Deserialize)]
struct WireVerdict {
    verified: Option<bool>,
    distance: Option<f64>,
    error: Option<String>,
}

/// Verifier that shells out per pair:
///
/// ```text
/// <program> <args...> <image_a> <image_b> <detector> <model>
/// ```
///
/// and expects `{"verified": bool, "distance": float}` or
/// `{"error": "..."}` on stdout.
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

impl CommandVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line into program and leading
    /// arguments, e.g. `"python3 verify_face.py"`.
    pub fn from_command_line(command_line: &str) -> Result<Self, VerifyError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| VerifyError::InvalidCommand(command_line.to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl Verifier for CommandVerifier {
    fn verify(
        &mut self,
        image_a: &Path,
        image_b: &Path,
        combination: &Combination,
    ) -> Result<Verification, VerifyError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image_a)
            .arg(image_b)
            .arg(combination.detector.as_str())
            .arg(combination.model.as_str())
            .output()
            .map_err(|source| VerifyError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let verdict: WireVerdict = match serde_json::from_str(stdout.trim()) {
            Ok(verdict) => verdict,
            Err(_) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = if stdout.trim().is_empty() {
                    stderr
                } else {
                    stdout
                };
                return Err(VerifyError::BadOutput(snippet(detail.trim())));
            }
        };

        if let Some(message) = verdict.error {
            return Err(VerifyError::Backend(message));
        }

        match (verdict.verified, verdict.distance) {
            (Some(verified), Some(distance)) => Ok(Verification { verified, distance }),
            _ => Err(VerifyError::BadOutput(snippet(stdout.trim()))),
        }
    }
}

fn snippet(text: &str) -> String {
    if text.len() <= OUTPUT_SNIPPET_LIMIT {
        text.to_string()
    } else {
        let mut end = OUTPUT_SNIPPET_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}
