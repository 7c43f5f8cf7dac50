use crate::{error::DocmarkError, pipeline::Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};

/// The configured processor chain: registry names, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub processors: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            processors: vec!["crossref".to_string()],
        }
    }
}

impl PipelineConfig {
    /// Instantiate the chain through the global processor registry.
    pub fn build(&self) -> Result<Pipeline, DocmarkError> {
        Pipeline::from_names(&self.processors)
    }
}

/// Reads and writes the pipeline configuration as a TOML document with a
/// single `pipeline` table.
#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn get_pipeline(&self) -> Result<PipelineConfig, DocmarkError> {
        tracing::debug!("Attempting to read pipeline config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using the default pipeline.");
            return Ok(PipelineConfig::default());
        }
        let content = read_to_string(&self.path)?;
        let config: BTreeMap<String, PipelineConfig> = toml::from_str(&content)?;
        config
            .get("pipeline")
            .cloned()
            .ok_or_else(|| DocmarkError::NotFound("pipeline not found in config".to_string()))
    }

    pub fn set_pipeline(&self, pipeline: PipelineConfig) -> Result<(), DocmarkError> {
        tracing::debug!("Attempting to write pipeline config to: {:?}", &self.path);
        let mut config = BTreeMap::new();
        config.insert("pipeline".to_string(), pipeline);
        let toml_string = toml::to_string(&config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}
