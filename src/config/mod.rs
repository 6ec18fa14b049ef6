use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::codec::{DecodeLimits, DEFAULT_MAX_OFFSET_BITS};
use crate::domain::abi::Abi;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodeConfig {
    /// Offsets and lengths must fit in this many bits
    #[serde(default = "default_max_offset_bits")]
    pub max_offset_bits: u32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_offset_bits: DEFAULT_MAX_OFFSET_BITS,
        }
    }
}

fn default_max_offset_bits() -> u32 {
    DEFAULT_MAX_OFFSET_BITS
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeConfig,

    /// Human-readable declarations known to the `decode` command
    #[serde(default)]
    pub signatures: Vec<String>,

    /// Contract JSON files loaded alongside `signatures`
    #[serde(default)]
    pub abi_paths: Vec<String>,
}

impl Config {
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_offset_bits: self.decode.max_offset_bits,
        }
    }

    /// Build one description from every configured source
    ///
    /// Unreadable sources are skipped with a warning.
    pub fn known_abi(&self) -> Abi {
        let mut abi = match Abi::from_human_readable(&self.signatures) {
            Ok(abi) => abi,
            Err(e) => {
                warn!(error = %e, "ignoring configured signatures");
                Abi::new()
            }
        };

        for path in &self.abi_paths {
            let loaded = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| Abi::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(other) => {
                    debug!(path = %path, methods = other.methods().len(), "loaded abi file");
                    abi.merge(other);
                }
                Err(e) => warn!(path = %path, error = %e, "skipping abi file"),
            }
        }
        abi
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match parse(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }
    }
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ABICODEC_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("abicodec").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("abicodec").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "abicodec", "abicodec")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.decode_limits(), DecodeLimits::default());
    }

    #[test]
    fn test_parse_sections() {
        let config = parse(
            r#"
            signatures = ["function transfer(address to, uint256 amount)"]

            [decode]
            max_offset_bits = 32
            "#,
        )
        .unwrap();
        assert_eq!(config.decode_limits().max_offset_bits, 32);

        let abi = config.known_abi();
        assert!(abi.method_by_selector_hex("0xa9059cbb").is_some());
    }

    #[test]
    fn test_bad_sources_are_skipped() {
        let config = Config {
            signatures: vec!["nonsense".to_string()],
            abi_paths: vec!["/nonexistent/abicodec/abi.json".to_string()],
            ..Config::default()
        };
        assert!(config.known_abi().is_empty());
    }

    #[test]
    fn test_rejects_unknown_value_types() {
        assert!(parse("[decode]\nmax_offset_bits = \"many\"").is_err());
    }
}
