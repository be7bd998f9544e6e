// Library root
// -----------
// The `orecast` binary is a thin wrapper around these modules.
//
// Module responsibilities:
// - `config`: service URLs and client credentials, loaded once in `main`.
// - `authz`: token exchange with the authz service and local JWT checks.
// - `api`: blocking HTTP client; authorized requests go through `dispatch`.
// - `ui`: terminal prompts and user facing output.
// - `commands`: one module per CLI command.
pub mod api;
pub mod authz;
pub mod commands;
pub mod config;
pub mod error;
pub mod ui;
