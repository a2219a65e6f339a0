use crate::cli::{Commands, OutputFormat};
use crate::errors::{DocxTableError, InvalidParamsError};
use anyhow::{Result, bail};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_this: Option<String>,
}

pub fn ensure_output_supported(format: OutputFormat, command: &Commands) -> Result<()> {
    match (format, command) {
        (OutputFormat::Json, _) | (OutputFormat::Csv, Commands::TableData { .. }) => Ok(()),
        (OutputFormat::Csv, _) => {
            bail!("csv output is only available for table-data; use --format json")
        }
    }
}

pub fn envelope_for(error: &anyhow::Error) -> ErrorEnvelope {
    if let Some(domain) = error.downcast_ref::<DocxTableError>() {
        return ErrorEnvelope {
            code: domain.code().to_string(),
            message: domain.to_string(),
            try_this: hint_for(domain),
        };
    }
    if let Some(invalid) = error.downcast_ref::<InvalidParamsError>() {
        return ErrorEnvelope {
            code: "INVALID_ARGUMENT".to_string(),
            message: invalid.message().to_string(),
            try_this: None,
        };
    }
    ErrorEnvelope {
        code: "COMMAND_FAILED".to_string(),
        message: format!("{error:#}"),
        try_this: None,
    }
}

fn hint_for(error: &DocxTableError) -> Option<String> {
    match error {
        DocxTableError::TableIndexOutOfRange { count, .. } if *count > 0 => Some(format!(
            "use a table index between 0 and {}; run list-tables to see them",
            count - 1
        )),
        DocxTableError::TableIndexOutOfRange { .. } => {
            Some("the document has no tables".to_string())
        }
        DocxTableError::RowOutOfRange { .. } | DocxTableError::ColumnOutOfRange { .. } => {
            Some("run table-data to see the current table shape".to_string())
        }
        _ => None,
    }
}
