use crate::cli::OutputFormat;
use anyhow::{Result, bail};
use serde_json::Value;
use std::io::Write;

pub fn emit_value(value: &Value, format: OutputFormat, compact: bool, quiet: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if matches!(format, OutputFormat::Csv) {
        let Some(csv) = value.get("data").and_then(Value::as_str) else {
            bail!("csv output is only available for table-data")
        };
        handle.write_all(csv.as_bytes())?;
        if !csv.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
        return Ok(());
    }

    if compact || quiet {
        serde_json::to_writer(&mut handle, value)?;
    } else {
        serde_json::to_writer_pretty(&mut handle, value)?;
    }
    handle.write_all(b"\n")?;
    Ok(())
}
