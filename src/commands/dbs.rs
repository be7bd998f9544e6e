// `orecast dbs`: read-only view of the data bookkeeping service.

use super::print_json;
use crate::api::{service_url, ApiClient};
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum DbsCommand {
    /// List datasets known to the bookkeeping service
    Ls,
}

pub fn execute(api: &ApiClient, cmd: DbsCommand) -> Result<()> {
    match cmd {
        DbsCommand::Ls => {
            let url = service_url(&api.config().services.data_bookkeeping_url, &["datasets"])?;
            let datasets: serde_json::Value = api.get(&url)?;
            print_json(&datasets)
        }
    }
}
