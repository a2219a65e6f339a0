pub mod commands;
pub mod errors;
pub mod output;

use crate::tools::param_enums::{SearchMode, TableDataFormat};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchModeArg {
    Contains,
    Exact,
    Regex,
}

impl From<SearchModeArg> for SearchMode {
    fn from(value: SearchModeArg) -> Self {
        match value {
            SearchModeArg::Contains => SearchMode::Contains,
            SearchModeArg::Exact => SearchMode::Exact,
            SearchModeArg::Regex => SearchMode::Regex,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DataShapeArg {
    Array,
    Records,
}

impl From<DataShapeArg> for TableDataFormat {
    fn from(value: DataShapeArg) -> Self {
        match value {
            DataShapeArg::Array => TableDataFormat::Array,
            DataShapeArg::Records => TableDataFormat::Object,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "docx-table-cli",
    version,
    about = "Inspect and edit tables in Word documents"
)]
pub struct Cli {
    /// `csv` is only available for `table-data`.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    #[arg(long, global = true)]
    pub compact: bool,

    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Table count, paragraph count and a summary per table.
    Describe { file: PathBuf },
    ListTables {
        file: PathBuf,
    },
    TableData {
        file: PathBuf,
        table: usize,
        #[arg(long, value_enum, default_value_t = DataShapeArg::Array)]
        shape: DataShapeArg,
        #[arg(long)]
        no_headers: bool,
    },
    Analyze {
        file: PathBuf,
        /// Analyze one table instead of the whole document.
        #[arg(long)]
        table: Option<usize>,
        #[arg(long)]
        details: bool,
        #[arg(long)]
        resolve_vertical_spans: bool,
    },
    Search {
        file: PathBuf,
        query: String,
        #[arg(long, value_enum, default_value_t = SearchModeArg::Contains)]
        mode: SearchModeArg,
        #[arg(long)]
        case_sensitive: bool,
        #[arg(long)]
        headers_only: bool,
    },
    /// Write one cell and save the document in place.
    SetCell {
        file: PathBuf,
        table: usize,
        row: usize,
        column: usize,
        value: String,
    },
}

pub async fn run_command(command: Commands, format: OutputFormat) -> Result<Value> {
    match command {
        Commands::Describe { file } => commands::read::describe(file).await,
        Commands::ListTables { file } => commands::read::list_tables(file).await,
        Commands::TableData {
            file,
            table,
            shape,
            no_headers,
        } => {
            let data_format = match format {
                OutputFormat::Csv => TableDataFormat::Csv,
                OutputFormat::Json => shape.into(),
            };
            commands::read::table_data(file, table, data_format, !no_headers).await
        }
        Commands::Analyze {
            file,
            table,
            details,
            resolve_vertical_spans,
        } => commands::read::analyze(file, table, details, resolve_vertical_spans).await,
        Commands::Search {
            file,
            query,
            mode,
            case_sensitive,
            headers_only,
        } => {
            commands::read::search(file, query, mode.into(), case_sensitive, headers_only).await
        }
        Commands::SetCell {
            file,
            table,
            row,
            column,
            value,
        } => commands::write::set_cell(file, table, row, column, value).await,
    }
}
