//! Optional TOML configuration for tsfilter
//!
//! ```toml
//! [filter]
//! any = true
//! patterns = ["TYPE:UTF8", " NULL$"]
//!
//! [reader]
//! buffer_size = 65536
//!
//! [render]
//! pretty = false
//! ```
//!
//! Command-line values take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use tsframe_codec::RenderOptions;
use tsframe_filter::FilterOptions;

/// Configuration file contents
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub filter: FilterSection,
    pub reader: ReaderSection,
    pub render: RenderSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub any: bool,
    pub exclude: bool,
    pub sub: bool,
    pub ignore_case: bool,

    /// Used when no patterns are given on the command line
    pub patterns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderSection {
    pub buffer_size: Option<usize>,
    pub max_frame_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub pretty: bool,
}

impl FileConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config file '{}'", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub patterns: Vec<String>,
    pub options: FilterOptions,
    pub render: RenderOptions,
    pub buffer_size: usize,
    pub max_frame_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::parse(
            r#"
            [filter]
            any = true
            sub = true
            patterns = ["a", "b"]

            [reader]
            buffer_size = 4096

            [render]
            pretty = true
            "#,
        )
        .unwrap();

        assert!(config.filter.any);
        assert!(!config.filter.exclude);
        assert!(config.filter.sub);
        assert_eq!(config.filter.patterns, vec!["a", "b"]);
        assert_eq!(config.reader.buffer_size, Some(4096));
        assert_eq!(config.reader.max_frame_len, None);
        assert!(config.render.pretty);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = FileConfig::parse("").unwrap();
        assert!(config.filter.patterns.is_empty());
        assert!(!config.filter.any);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("[filter]\nanything = true\n").is_err());
    }
}
