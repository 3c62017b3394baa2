//! Response processing command — `drydock process`.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use drydock::response::ResponseProcessor;

/// Run the response processor over a transcript file (or stdin when the
/// path is `-`) and print the structured result as JSON.
pub fn cmd_process(transcript: &Path) -> Result<()> {
    let raw = if transcript.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read transcript from stdin")?;
        buf
    } else {
        std::fs::read_to_string(transcript)
            .with_context(|| format!("Failed to read transcript {}", transcript.display()))?
    };

    let processed = ResponseProcessor::new().process(&raw);
    println!("{}", serde_json::to_string_pretty(&processed)?);
    Ok(())
}
