#![allow(dead_code)]
use anyhow::Result;
use docx_table_mcp::config::ServerConfig;
use docx_table_mcp::server::DocxTableServer;
use rmcp::{RoleClient, ServiceExt, model::CallToolRequestParam, service::RunningService};
use serde_json::Value;
use std::sync::Arc;

pub fn call_tool(name: &'static str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: args.as_object().cloned(),
    }
}

/// Serve `config` in-process and connect a client to it over an in-memory pipe.
pub async fn connect(config: ServerConfig) -> Result<RunningService<RoleClient, ()>> {
    let server = DocxTableServer::new(Arc::new(config)).await?;
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        match server.serve(server_io).await {
            Ok(service) => {
                let _ = service.waiting().await;
            }
            Err(error) => eprintln!("[server] failed to start: {error:?}"),
        }
    });
    let client = ().serve(client_io).await?;
    Ok(client)
}

pub fn extract_json(result: &rmcp::model::CallToolResult) -> Result<Value> {
    result
        .structured_content
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no structured content in response"))
}
