// `orecast meta`: records of the metadata service.

use super::{print_json, read_record, Outcome};
use crate::api::{service_url, ApiClient};
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum MetaCommand {
    /// List metadata records
    Ls,
    /// Add a metadata record from a JSON file
    Add { file: PathBuf },
    /// Remove a metadata record by id
    Remove { id: String },
}

pub fn execute(api: &mut ApiClient, cmd: MetaCommand) -> Result<Vec<Outcome>> {
    let base = api.config().services.metadata_url.clone();
    match cmd {
        MetaCommand::Ls => {
            let records: serde_json::Value = api.get(&service_url(&base, &["meta"])?)?;
            print_json(&records)?;
            Ok(Vec::new())
        }
        MetaCommand::Add { file } => {
            let record = read_record(&file)?;
            let resp = api.post_json(&service_url(&base, &["meta"])?, &record)?;
            Ok(vec![Outcome::from_response("add meta record", &resp)])
        }
        MetaCommand::Remove { id } => {
            let resp = api.delete(&service_url(&base, &["meta", id.as_str()])?)?;
            Ok(vec![Outcome::from_response(&format!("remove meta record {}", id), &resp)])
        }
    }
}
