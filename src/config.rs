use anyhow::{Context as AnyhowContext, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cleaner::CleanOptions;
use crate::constants::constants;
use crate::writer::OutputFormat;

/// One layer of configuration. Every field is optional so that layers can be
/// stacked: global file, then the folder's local file, then command line.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Words per chunk; 0 or unset writes the transcript as one chunk
    pub chunk_size: Option<usize>,
    pub output_suffix: Option<String>,
    pub format: Option<OutputFormat>,
    pub recursive: Option<bool>,
    pub strip_header: Option<bool>,
    pub dedupe_lines: Option<bool>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub chunk_size: Option<usize>,
    pub output_suffix: String,
    pub format: OutputFormat,
    pub recursive: bool,
    pub clean: CleanOptions,
}

impl Config {
    /// Stack `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: Config) -> Config {
        Config {
            chunk_size: other.chunk_size.or(self.chunk_size),
            output_suffix: other.output_suffix.or(self.output_suffix),
            format: other.format.or(self.format),
            recursive: other.recursive.or(self.recursive),
            strip_header: other.strip_header.or(self.strip_header),
            dedupe_lines: other.dedupe_lines.or(self.dedupe_lines),
        }
    }

    pub fn resolve(&self) -> Settings {
        Settings {
            chunk_size: self.chunk_size.filter(|&size| size > 0),
            output_suffix: self
                .output_suffix
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_OUTPUT_SUFFIX.to_string()),
            format: self.format.unwrap_or_default(),
            recursive: self.recursive.unwrap_or(false),
            clean: CleanOptions {
                strip_header: self.strip_header.unwrap_or(false),
                dedupe_lines: self.dedupe_lines.unwrap_or(false),
            },
        }
    }
}

pub struct ConfigManager {
    merged_config: Config,
    pub global_config_path: Option<PathBuf>,
    pub local_config_path: PathBuf,
}

const DEFAULT_CONFIG: &str = r#"# vttclean configuration file
#
# Global settings live in <config dir>/vttclean/config.toml.
# A .vttclean.toml inside the input folder overrides them, and command
# line flags override both.

# Optional: split each transcript into chunks of this many words (0 = off)
# chunk_size = 200

# Optional: appended to the file stem of every output file
# output_suffix = "_cleaned"

# Optional: "text" (chunks separated by blank lines) or "json"
# format = "text"

# Optional: also clean .vtt files in subdirectories
# recursive = false

# Optional: drop the WEBVTT header and NOTE/STYLE/REGION blocks
# strip_header = false

# Optional: drop lines repeating the previous line (rolling captions)
# dedupe_lines = false
"#;

pub fn default_config() -> &'static str {
    DEFAULT_CONFIG
}

impl ConfigManager {
    /// Load the global config (or `global_override` if given) and the local
    /// config found in `folder`.
    pub fn new(folder: &Path, global_override: Option<&Path>) -> Result<Self> {
        let global_config_path = match global_override {
            Some(path) => Some(path.to_path_buf()),
            None => dirs::config_dir().map(|dir| {
                dir.join(constants::GLOBAL_CONFIG_DIR_NAME)
                    .join(constants::CONFIG_FILENAME)
            }),
        };
        let local_config_path = folder.join(constants::LOCAL_CONFIG_FILENAME);

        Self::load(global_config_path, local_config_path)
    }

    pub fn load(global_config_path: Option<PathBuf>, local_config_path: PathBuf) -> Result<Self> {
        let global_config = match &global_config_path {
            Some(path) => read_config(path)?,
            None => None,
        };
        let local_config = read_config(&local_config_path)?;

        // Merge configs: local overrides global
        let mut merged_config = global_config.unwrap_or_default();
        if let Some(local_config) = local_config {
            merged_config = merged_config.merge(local_config);
        }

        Ok(Self {
            merged_config,
            global_config_path,
            local_config_path,
        })
    }

    /// Get the merged configuration (local overrides global)
    pub fn config(&self) -> &Config {
        &self.merged_config
    }
}

fn read_config(path: &Path) -> Result<Option<Config>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}
