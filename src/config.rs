use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8000";
const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1_000_000;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
const DEFAULT_MAX_OPEN_DOCUMENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[value(alias = "streamable-http", alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "streamable-http", alias = "stream-http", alias = "stream_http")]
    Http,
    Stdio,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Stdio => write!(f, "stdio"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub workspace_root: PathBuf,
    pub enabled_tools: Option<HashSet<String>>,
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
    pub tool_timeout_ms: Option<u64>,
    pub max_response_bytes: Option<u64>,
    /// Documents larger than this are refused on open.
    pub max_file_size_bytes: Option<u64>,
    /// Upper bound on simultaneously open sessions. Sessions are never
    /// evicted implicitly since they may hold unsaved edits.
    pub max_open_documents: usize,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            workspace_root: cli_workspace_root,
            enabled_tools: cli_enabled_tools,
            transport: cli_transport,
            http_bind: cli_http_bind,
            tool_timeout_ms: cli_tool_timeout_ms,
            max_response_bytes: cli_max_response_bytes,
            max_file_size_mb: cli_max_file_size_mb,
            max_open_documents: cli_max_open_documents,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            workspace_root: file_workspace_root,
            enabled_tools: file_enabled_tools,
            transport: file_transport,
            http_bind: file_http_bind,
            tool_timeout_ms: file_tool_timeout_ms,
            max_response_bytes: file_max_response_bytes,
            max_file_size_mb: file_max_file_size_mb,
            max_open_documents: file_max_open_documents,
        } = file_config;

        let workspace_root = cli_workspace_root
            .or(file_workspace_root)
            .unwrap_or_else(|| PathBuf::from("."));

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.trim().to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let transport = cli_transport
            .or(file_transport)
            .unwrap_or(TransportKind::Stdio);

        let http_bind_address = cli_http_bind.or(file_http_bind).unwrap_or_else(|| {
            DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid")
        });

        let tool_timeout_ms = cli_tool_timeout_ms
            .or(file_tool_timeout_ms)
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_MS);
        let tool_timeout_ms = if tool_timeout_ms == 0 {
            None
        } else {
            Some(tool_timeout_ms)
        };

        let max_response_bytes = cli_max_response_bytes
            .or(file_max_response_bytes)
            .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES);
        let max_response_bytes = if max_response_bytes == 0 {
            None
        } else {
            Some(max_response_bytes)
        };

        let max_file_size_mb = cli_max_file_size_mb
            .or(file_max_file_size_mb)
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);
        let max_file_size_bytes = if max_file_size_mb == 0 {
            None
        } else {
            Some(max_file_size_mb * 1024 * 1024)
        };

        let max_open_documents = cli_max_open_documents
            .or(file_max_open_documents)
            .unwrap_or(DEFAULT_MAX_OPEN_DOCUMENTS)
            .max(1);

        Ok(Self {
            workspace_root,
            enabled_tools,
            transport,
            http_bind_address,
            tool_timeout_ms,
            max_response_bytes,
            max_file_size_bytes,
            max_open_documents,
        })
    }

    /// Configuration rooted at `workspace_root` with every default applied.
    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            enabled_tools: None,
            transport: TransportKind::Stdio,
            http_bind_address: DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid"),
            tool_timeout_ms: Some(DEFAULT_TOOL_TIMEOUT_MS),
            max_response_bytes: Some(DEFAULT_MAX_RESPONSE_BYTES),
            max_file_size_bytes: Some(DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024),
            max_open_documents: DEFAULT_MAX_OPEN_DOCUMENTS,
        }
    }

    pub fn ensure_workspace_root(&self) -> Result<()> {
        anyhow::ensure!(
            self.workspace_root.exists(),
            "workspace root {:?} does not exist",
            self.workspace_root
        );
        anyhow::ensure!(
            self.workspace_root.is_dir(),
            "workspace root {:?} is not a directory",
            self.workspace_root
        );
        Ok(())
    }

    pub fn resolve_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.workspace_root.join(relative)
        }
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_ms.and_then(|ms| {
            if ms > 0 {
                Some(Duration::from_millis(ms))
            } else {
                None
            }
        })
    }

    pub fn max_response_bytes(&self) -> Option<usize> {
        self.max_response_bytes.and_then(|bytes| {
            if bytes > 0 {
                Some(bytes as usize)
            } else {
                None
            }
        })
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "docx-table-mcp",
    about = "MCP server for Word document tables",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_WORKSPACE",
        value_name = "DIR",
        help = "Workspace root that relative document paths resolve against"
    )]
    pub workspace_root: Option<PathBuf>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (stdio or http)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport (default: 127.0.0.1:8000)"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_TOOL_TIMEOUT_MS",
        value_name = "MS",
        help = "Tool request timeout in milliseconds (default: 30000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub tool_timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_MAX_RESPONSE_BYTES",
        value_name = "BYTES",
        help = "Max response size in bytes (default: 1000000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub max_response_bytes: Option<u64>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_MAX_FILE_SIZE_MB",
        value_name = "MB",
        help = "Largest document accepted by open_document (default: 50; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub max_file_size_mb: Option<u64>,

    #[arg(
        long,
        env = "DOCX_TABLE_MCP_MAX_OPEN_DOCUMENTS",
        value_name = "N",
        help = "Maximum number of documents open at once (default: 32)",
        value_parser = clap::value_parser!(usize)
    )]
    pub max_open_documents: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    workspace_root: Option<PathBuf>,
    enabled_tools: Option<Vec<String>>,
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
    tool_timeout_ms: Option<u64>,
    max_response_bytes: Option<u64>,
    max_file_size_mb: Option<u64>,
    max_open_documents: Option<usize>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
