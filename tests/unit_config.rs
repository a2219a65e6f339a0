use std::fs;

use clap::Parser;
use docx_table_mcp::{CliArgs, ServerConfig, TransportKind};

#[test]
fn merges_config_file_and_cli_overrides() {
    let workspace = tempfile::tempdir().expect("workspace tempdir");
    let config_dir = tempfile::tempdir().expect("config tempdir");
    let config_path = config_dir.path().join("server.yaml");
    let yaml = format!(
        "workspace_root: {}\ntransport: http\nmax_open_documents: 4\ntool_timeout_ms: 5000\n",
        workspace.path().display()
    );
    fs::write(&config_path, yaml).expect("write config");

    let args = CliArgs::parse_from([
        "docx-table-mcp",
        "--config",
        config_path.to_str().unwrap(),
        "--max-open-documents",
        "9",
        "--enabled-tools",
        "open_document, Analyze_Table_Structure",
    ]);
    let config = ServerConfig::from_args(args).expect("config");

    assert_eq!(config.workspace_root, workspace.path().to_path_buf());
    assert_eq!(config.transport, TransportKind::Http);
    assert_eq!(config.max_open_documents, 9);
    assert_eq!(config.tool_timeout_ms, Some(5000));
    let mut enabled = config.enabled_tools.clone().expect("enabled set");
    assert!(enabled.remove("open_document"));
    assert!(enabled.remove("analyze_table_structure"));
    assert!(enabled.is_empty());
    assert!(config.is_tool_enabled("OPEN_DOCUMENT"));
    assert!(!config.is_tool_enabled("delete_table"));
    assert_eq!(
        config.http_bind_address,
        "127.0.0.1:8000".parse().expect("default bind")
    );
}

#[test]
fn zero_limits_disable_them() {
    let workspace = tempfile::tempdir().expect("workspace tempdir");
    let args = CliArgs {
        workspace_root: Some(workspace.path().to_path_buf()),
        tool_timeout_ms: Some(0),
        max_response_bytes: Some(0),
        max_file_size_mb: Some(0),
        max_open_documents: Some(0),
        ..CliArgs::default()
    };
    let config = ServerConfig::from_args(args).expect("config");

    assert_eq!(config.tool_timeout(), None);
    assert_eq!(config.max_response_bytes(), None);
    assert_eq!(config.max_file_size_bytes, None);
    assert_eq!(config.max_open_documents, 1);
    assert_eq!(config.transport, TransportKind::Stdio);
}

#[test]
fn json_config_files_are_accepted() {
    let workspace = tempfile::tempdir().expect("workspace tempdir");
    let config_path = workspace.path().join("server.json");
    fs::write(
        &config_path,
        r#"{"max_file_size_mb": 2, "max_response_bytes": 4096}"#,
    )
    .expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        ..CliArgs::default()
    };
    let config = ServerConfig::from_args(args).expect("config");
    assert_eq!(config.max_file_size_bytes, Some(2 * 1024 * 1024));
    assert_eq!(config.max_response_bytes(), Some(4096));
}

#[test]
fn unsupported_config_extension_is_error() {
    let workspace = tempfile::tempdir().expect("workspace tempdir");
    let config_path = workspace.path().join("server.toml");
    fs::write(&config_path, "transport = 'http'").expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        ..CliArgs::default()
    };
    let err = ServerConfig::from_args(args).expect_err("expected failure");
    assert!(err.to_string().contains("unsupported config extension"));
}

#[test]
fn ensure_workspace_root_errors_for_missing_dir() {
    let config = ServerConfig::for_workspace("/this/does/not/exist");
    let err = config.ensure_workspace_root().expect_err("missing dir");
    assert!(
        err.to_string()
            .contains("workspace root \"/this/does/not/exist\"")
    );
}
