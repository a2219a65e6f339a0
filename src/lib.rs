pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod model;
pub mod runtime;
pub mod security;
pub mod server;
pub mod state;
pub mod tools;
pub mod validation;

pub use config::{CliArgs, ServerConfig, TransportKind};
pub use server::DocxTableServer;

use anyhow::Result;
use std::sync::Arc;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let server = DocxTableServer::new(Arc::new(config)).await?;
    server.run().await
}
