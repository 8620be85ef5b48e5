use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
