// Library root
// -----------
// The binary (`main.rs`) wires these modules together to walk through
// provisioning a database with the Enterprise Manager DBaaS REST API.
//
// Module responsibilities:
// - `config`: run configuration, defaults overridable from the environment.
// - `api`: the blocking HTTP helper, media types and resource paths.
// - `models`: typed views of the JSON documents and the request payload.
// - `poll`: waiting for a provisioning request to reach its final status.
// - `procedure`: the ordered walkthrough steps.
// - `ui`: console output, the pause between steps and the wait spinner.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod poll;
pub mod procedure;
pub mod ui;

pub use error::{DemoError, Result};
