// `orecast s3`: buckets and objects of the data management service.

use super::{print_json, Outcome};
use crate::api::{service_url, ApiClient};
use crate::ui::{report, upload_progress};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum S3Command {
    /// List a site's buckets, or the content of one bucket (site/bucket)
    Ls { path: String },
    /// Create a bucket (site/bucket)
    Create { bucket: String },
    /// Delete a bucket or an object (site/bucket[/object])
    Delete { path: String },
    /// Upload a file, or every file of a directory, to a bucket
    Upload { bucket: String, source: PathBuf },
}

pub fn execute(api: &mut ApiClient, cmd: S3Command) -> Result<Vec<Outcome>> {
    let base = api.config().services.data_management_url.clone();
    match cmd {
        S3Command::Ls { path } => {
            info!("list bucket {}", path);
            let record: serde_json::Value = api.get(&storage_url(&base, &path, None)?)?;
            print_json(&record)?;
            Ok(Vec::new())
        }
        S3Command::Create { bucket } => {
            info!("create bucket {}", bucket);
            let resp = api.post(&storage_url(&base, &bucket, None)?)?;
            Ok(vec![Outcome::from_response(&format!("create bucket {}", bucket), &resp)])
        }
        S3Command::Delete { path } => {
            info!("delete {}", path);
            let resp = api.delete(&storage_url(&base, &path, None)?)?;
            Ok(vec![Outcome::from_response(&format!("delete {}", path), &resp)])
        }
        S3Command::Upload { bucket, source } => upload(api, &base, &bucket, &source),
    }
}

/// `{base}/storage/<site>/<bucket>[/<object>]`. The storage path is split on
/// `/`; each part, and the object name, is escaped as a single segment.
fn storage_url(base: &str, path: &str, object: Option<&str>) -> Result<String> {
    let mut segments = vec!["storage"];
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    segments.extend(object);
    service_url(base, segments.as_slice())
}

/// Upload every file of `source` to `bucket`. One token is obtained for the
/// whole command and dropped when it returns.
///
/// If a file fails, the outcomes of the files already sent are printed
/// before the error is returned.
fn upload(api: &mut ApiClient, base: &str, bucket: &str, source: &Path) -> Result<Vec<Outcome>> {
    let files = upload_files(source)?;
    if files.is_empty() {
        bail!("no files to upload in {}", source.display());
    }
    let token = api.access_token().context("Failed to obtain access token")?;

    let pb = upload_progress(files.len() as u64);
    let mut outcomes = Vec::with_capacity(files.len());
    for path in &files {
        match upload_one(api, base, bucket, path, &token, &pb) {
            Ok(outcome) => {
                outcomes.push(outcome);
                pb.inc(1);
            }
            Err(e) => {
                pb.abandon();
                for outcome in &outcomes {
                    report(outcome);
                }
                return Err(e.context(format!(
                    "upload to {} stopped after {} of {} files",
                    bucket,
                    outcomes.len(),
                    files.len()
                )));
            }
        }
    }
    pb.finish_and_clear();
    Ok(outcomes)
}

fn upload_one(
    api: &ApiClient,
    base: &str,
    bucket: &str,
    path: &Path,
    token: &str,
    pb: &ProgressBar,
) -> Result<Outcome> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Unsupported file name {}", path.display()))?;
    pb.set_message(name.to_string());
    info!("upload {} to bucket {}", path.display(), bucket);
    let url = storage_url(base, bucket, Some(name))?;
    let resp = api.upload_file(&url, path, token)?;
    let action = format!("upload {} to {}", name, bucket);
    Ok(match resp.rest.get("msg").and_then(|m| m.as_str()) {
        Some(msg) if resp.is_ok() => Outcome::Success(format!("{} succeeded: {}", action, msg)),
        _ => Outcome::from_response(&action, &resp),
    })
}

/// A file uploads as itself; a directory uploads the regular files directly
/// inside it, sorted by name. Subdirectories are skipped.
fn upload_files(source: &Path) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(source)
        .with_context(|| format!("Failed to stat {}", source.display()))?;
    if !meta.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(source)
        .with_context(|| format!("Failed to read directory {}", source.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
