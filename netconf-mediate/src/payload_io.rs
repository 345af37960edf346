use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Read the payload from a file, or stdin when the path is `-`.
pub fn read_payload(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input)
        .with_context(|| format!("failed to read payload {}", input.display()))
}

/// Write the result to a file, or stdout when no path is given.
pub fn emit_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write output {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}
