// `orecast token`: run the exchange and print the bearer token.

use crate::api::ApiClient;
use anyhow::Result;

pub fn execute(api: &mut ApiClient) -> Result<String> {
    let token = api.access_token()?;
    Ok(token)
}
