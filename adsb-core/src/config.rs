//! Configuration file management for the ADS-B decoder.
//!
//! Reads/writes `~/.adsb-decode/config.yaml`. Every field documented in
//! this module has a default, so a missing or partially-filled file never
//! prevents startup — `load_config()` falls back to [`Config::default`]
//! field-by-field via [`parse_config`]. CLI flags and environment variables
//! (handled by the `adsb-server` binary, not this crate) take precedence
//! over whatever this file contains.

use std::path::PathBuf;

use crate::types::AdsbError;

/// Full configuration structure, constructible from a config file and
/// overridable by CLI flags or environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Byte-stream endpoints (`host:port`) to connect to. Each is opened in
    /// its own task; on I/O failure that task retries after a 30-second
    /// back-off. An empty list is a valid (if useless) configuration.
    pub input_sources: Vec<String>,
    /// Receiver's own latitude, required for surface-position global decode.
    pub receiver_reference_latitude: Option<f64>,
    /// Receiver's own longitude, required for surface-position global decode.
    pub receiver_reference_longitude: Option<f64>,
    /// Network address (`host:port`) to serve the read-only observer surface
    /// on. Unset means the surface is not served.
    pub observer_endpoint: Option<String>,
    /// Lower the logging subsystem's minimum level from `info` to `debug`.
    pub debug_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_sources: Vec::new(),
            receiver_reference_latitude: None,
            receiver_reference_longitude: None,
            observer_endpoint: None,
            debug_logging: false,
        }
    }
}

/// Get the config directory path (`~/.adsb-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".adsb-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.adsb-decode/config.yaml`.
///
/// Returns the default config if the file doesn't exist, can't be read, or
/// fails to parse — a broken config file is never a startup error.
pub fn load_config() -> Config {
    let path = config_file();
    let Ok(text) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    parse_config(&text)
}

/// Save config to `~/.adsb-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, AdsbError> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| AdsbError::Config(e.to_string()))?;

    let path = config_file();
    let text = serialize_config(config);
    std::fs::write(&path, text).map_err(|e| AdsbError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse simple YAML-like config text, applying recognised keys over
/// [`Config::default`]. Unrecognised keys and malformed values are ignored
/// rather than rejected.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut in_input_sources = false;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        if let Some(item) = stripped.strip_prefix("- ") {
            if in_input_sources {
                if let Some(v) = parse_string_value(item.trim()) {
                    config.input_sources.push(v);
                }
            }
            continue;
        }
        in_input_sources = false;

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        match key {
            "input_sources" => in_input_sources = val.is_empty(),
            "receiver_reference_latitude" => {
                config.receiver_reference_latitude = parse_float_value(val);
            }
            "receiver_reference_longitude" => {
                config.receiver_reference_longitude = parse_float_value(val);
            }
            "observer_endpoint" => config.observer_endpoint = parse_string_value(val),
            "debug_logging" => config.debug_logging = val == "true",
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# adsb-decode configuration".to_string(), String::new()];

    if config.input_sources.is_empty() {
        lines.push("input_sources: []".into());
    } else {
        lines.push("input_sources:".into());
        for source in &config.input_sources {
            lines.push(format!("  - \"{source}\""));
        }
    }
    lines.push(String::new());

    match config.receiver_reference_latitude {
        Some(v) => lines.push(format!("receiver_reference_latitude: {v}")),
        None => lines.push("receiver_reference_latitude: null".into()),
    }
    match config.receiver_reference_longitude {
        Some(v) => lines.push(format!("receiver_reference_longitude: {v}")),
        None => lines.push("receiver_reference_longitude: null".into()),
    }
    lines.push(String::new());

    match &config.observer_endpoint {
        Some(addr) => lines.push(format!("observer_endpoint: \"{addr}\"")),
        None => lines.push("observer_endpoint: null".into()),
    }
    lines.push(format!("debug_logging: {}", config.debug_logging));

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input_sources.is_empty());
        assert!(config.observer_endpoint.is_none());
        assert!(!config.debug_logging);
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
input_sources:
  - "127.0.0.1:30005"
  - "192.168.1.50:30005"

receiver_reference_latitude: 35.5
receiver_reference_longitude: -82.5
observer_endpoint: "0.0.0.0:8080"
debug_logging: true
"#;
        let config = parse_config(text);
        assert_eq!(
            config.input_sources,
            vec!["127.0.0.1:30005".to_string(), "192.168.1.50:30005".to_string()]
        );
        assert_eq!(config.receiver_reference_latitude, Some(35.5));
        assert_eq!(config.receiver_reference_longitude, Some(-82.5));
        assert_eq!(config.observer_endpoint, Some("0.0.0.0:8080".into()));
        assert!(config.debug_logging);
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = r#"
receiver_reference_latitude: null
receiver_reference_longitude: ~
observer_endpoint: null
"#;
        let config = parse_config(text);
        assert!(config.receiver_reference_latitude.is_none());
        assert!(config.receiver_reference_longitude.is_none());
        assert!(config.observer_endpoint.is_none());
    }

    #[test]
    fn test_parse_config_missing_file_equivalent_is_default() {
        let config = parse_config("");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_roundtrip_every_field() {
        let config = Config {
            input_sources: vec!["127.0.0.1:30005".into()],
            receiver_reference_latitude: Some(35.5),
            receiver_reference_longitude: Some(-82.5),
            observer_endpoint: Some("0.0.0.0:8080".into()),
            debug_logging: true,
        };
        let text = serialize_config(&config);
        let parsed = parse_config(&text);
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_roundtrip_all_defaults() {
        let config = Config::default();
        let text = serialize_config(&config);
        let parsed = parse_config(&text);
        assert_eq!(parsed, config);
    }
}
