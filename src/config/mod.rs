pub mod path;


use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::BLE_HANDLE,
    drivers::xbox_ble::{
        decoder::Decoder,
        router::AttRouter,
        tree::{LabelStyle, SummaryStyle},
    },
};

/// Represents all possible errors loading a [DecoderConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Decoder configuration, loaded from YAML
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DecoderConfig {
    pub version: u32,
    /// ATT handles whose notifications carry input reports
    #[serde(default = "default_att_handles")]
    pub att_handles: Vec<u16>,
    #[serde(default)]
    pub labels: LabelStyle,
    #[serde(default)]
    pub summary: SummaryStyle,
}

fn default_att_handles() -> Vec<u16> {
    vec![BLE_HANDLE]
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            att_handles: default_att_handles(),
            labels: Default::default(),
            summary: Default::default(),
        }
    }
}

impl DecoderConfig {
    /// Load a [DecoderConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<DecoderConfig, LoadError> {
        let config: DecoderConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [DecoderConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<DecoderConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: DecoderConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the config from the given path, or from the first config file
    /// found in the search paths. Falls back to the defaults if none exist.
    pub fn load(config_path: Option<&Path>) -> Result<DecoderConfig, LoadError> {
        if let Some(path) = config_path {
            log::debug!("Loading config from {path:?}");
            return Self::from_yaml_file(path);
        }

        for path in path::get_config_paths() {
            if !path.is_file() {
                log::trace!("No config at {path:?}");
                continue;
            }
            log::debug!("Loading config from {path:?}");
            return Self::from_yaml_file(path);
        }

        log::debug!("No config file found. Using defaults.");
        Ok(DecoderConfig::default())
    }

    /// Create an [AttRouter] for the configured handles using the default
    /// report layout.
    pub fn router(&self) -> AttRouter {
        let decoder = Decoder::default();
        AttRouter::new(decoder, self.att_handles.iter().copied())
    }
}
