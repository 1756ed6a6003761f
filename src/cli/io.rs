//! JSON output for one-shot commands
//!
//! Each command writes a single JSON object to stdout. Logs go to stderr.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Writes `{"status": "ok", "data": ...}` as one line
pub fn write_response(data: Value) -> CliResult<()> {
    write_to(&mut io::stdout(), data)
}

fn write_to(out: &mut impl Write, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
