use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::constants;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Chunks separated by a blank line
    #[default]
    Text,
    /// A JSON document with the chunks and some metadata
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct CleanedTranscript<'a> {
    source: String,
    chunk_size: Option<usize>,
    word_count: usize,
    chunks: &'a [String],
}

pub struct Writer {
    suffix: String,
    format: OutputFormat,
}

impl Writer {
    pub fn new(suffix: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            suffix: suffix.into(),
            format,
        }
    }

    /// `<dir>/<stem><suffix>.<ext>` next to `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        input.with_file_name(format!(
            "{}{}.{}",
            stem,
            self.suffix,
            self.format.extension()
        ))
    }

    pub fn render(&self, input: &Path, chunk_size: Option<usize>, chunks: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(chunks
                .iter()
                .map(|chunk| format!("{}{}", chunk, constants::CHUNK_SEPARATOR))
                .collect()),
            OutputFormat::Json => {
                let transcript = CleanedTranscript {
                    source: input
                        .file_name()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    chunk_size,
                    word_count: chunks.iter().map(|c| c.split_whitespace().count()).sum(),
                    chunks,
                };
                let mut json = serde_json::to_string_pretty(&transcript)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    /// Render `chunks` and write them next to `input`, returning the output path.
    pub fn write(&self, input: &Path, chunk_size: Option<usize>, chunks: &[String]) -> Result<PathBuf> {
        let output = self.output_path(input);
        let content = self.render(input, chunk_size, chunks)?;

        fs::write(&output, content)
            .with_context(|| format!("Failed to write output file: {}", output.display()))?;

        Ok(output)
    }
}
