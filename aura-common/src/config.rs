//! Configuration loading and data directory resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Service settings loaded from the TOML config file.
///
/// All fields have defaults so a missing or partial file is never fatal;
/// the API key is the only setting without a usable default and is also
/// readable from the `AURA_TEXTGEN_API_KEY` environment variable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP bind address for the generation service
    pub bind_address: String,
    /// Database filename inside the data directory
    pub database_file: String,
    /// Text-generation settings
    pub text_generation: TextGenerationConfig,
}

/// Settings for the external text-completion service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextGenerationConfig {
    /// Base URL of an OpenAI-compatible completion endpoint
    pub endpoint: String,
    /// Model identifier passed through to the endpoint
    pub model: String,
    /// API key; falls back to AURA_TEXTGEN_API_KEY when empty
    pub api_key: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5810".to_string(),
            database_file: "aura.db".to_string(),
            text_generation: TextGenerationConfig::default(),
        }
    }
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the platform config file, falling back to
    /// defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Ok(path) => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid config file {:?}: {}", path, e)))?
            }
            Err(_) => Self::default(),
        };

        if config.text_generation.api_key.is_empty() {
            if let Ok(key) = std::env::var("AURA_TEXTGEN_API_KEY") {
                config.text_generation.api_key = key;
            }
        }

        Ok(config)
    }
}

/// Resolve the data directory, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file `data_dir` key
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = config_file_path() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_dir())
}

/// Get the configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/aura/config.toml first, then /etc/aura/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("aura").join("config.toml"));
        let system_config = PathBuf::from("/etc/aura/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("aura").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("aura"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/aura"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("aura"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/aura"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("aura"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\aura"))
    } else {
        PathBuf::from("./aura_data")
    }
}
