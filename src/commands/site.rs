// `orecast site`: sites registered in the discovery service.

use super::{print_json, read_record, Outcome};
use crate::api::{service_url, ApiClient};
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum SiteCommand {
    /// List registered sites
    Ls,
    /// Register a site described by a JSON file
    Add { file: PathBuf },
    /// Remove a site by name
    Remove { name: String },
}

pub fn execute(api: &mut ApiClient, cmd: SiteCommand) -> Result<Vec<Outcome>> {
    let base = api.config().services.discovery_url.clone();
    match cmd {
        SiteCommand::Ls => {
            let sites: serde_json::Value = api.get(&service_url(&base, &["sites"])?)?;
            print_json(&sites)?;
            Ok(Vec::new())
        }
        SiteCommand::Add { file } => {
            let record = read_record(&file)?;
            let resp = api.post_json(&service_url(&base, &["sites"])?, &record)?;
            Ok(vec![Outcome::from_response("add site", &resp)])
        }
        SiteCommand::Remove { name } => {
            let resp = api.delete(&service_url(&base, &["site", name.as_str()])?)?;
            Ok(vec![Outcome::from_response(&format!("remove site {}", name), &resp)])
        }
    }
}
