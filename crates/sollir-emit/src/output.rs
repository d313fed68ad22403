use crate::config::EmitterConfig;
use crate::sollir_emitter::SollirEmitter;
use anyhow::Result;
use sollir_core::Contract;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "ir" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format `{}`", other)),
        }
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_object<W: Write>(writer: &mut W, obj: &serde_json::Value) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, obj)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Writes `contract` in the requested format.
pub fn write_contract<W: Write>(
    writer: &mut W,
    contract: &Contract,
    format: OutputFormat,
    config: &EmitterConfig,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let text = SollirEmitter::new(config.clone()).render(contract)?;
            writer.write_all(text.as_bytes())?;
        }
        OutputFormat::Json => {
            let value = serde_json::to_value(contract)?;
            JsonFormatter::format_object(writer, &value)?;
        }
    }
    Ok(())
}
