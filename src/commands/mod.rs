// Command handlers for the `orecast` binary.
//
// Each module owns the clap arguments of one top-level command and an
// `execute` function. Reads print JSON directly; mutations return an
// `Outcome` built from the service envelope so `main` can report it.

pub mod dbs;
pub mod meta;
pub mod s3;
pub mod site;
pub mod token;

use crate::api::ServiceResponse;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// User facing result of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Warning(String),
}

impl Outcome {
    /// "ok" is success; any other status, including a repeated delete of
    /// something already gone, is a warning.
    pub fn from_response(action: &str, resp: &ServiceResponse) -> Self {
        if resp.is_ok() {
            Outcome::Success(format!("{} succeeded", action))
        } else {
            Outcome::Warning(format!("{} failed: {}", action, resp.reason()))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Pretty-print any JSON value on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", out);
    Ok(())
}

/// Read a JSON record (site or metadata description) from a file.
pub(crate) fn read_record(path: &Path) -> Result<serde_json::Value> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {}", path.display()))
}
