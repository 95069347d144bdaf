//! The `.nam` model-data document.
//!
//! A JSON file carrying the architecture tag, the model configuration and
//! one flat weight array. The `version` field is advisory: it is logged
//! but never validated.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::weights::WeightReader;

use super::{Config, Model};

const SUPPORTED_ARCHITECTURE: &str = "WaveNet";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelData {
    #[serde(default)]
    pub version: String,
    pub architecture: String,
    pub config: Config,
    pub weights: Vec<f32>,
}

impl ModelData {
    /// Reads and validates a model-data document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads and validates a model-data document from a JSON stream.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let data: ModelData = serde_json::from_reader(reader)?;
        if data.architecture != SUPPORTED_ARCHITECTURE {
            return Err(Error::Config(format!(
                "only the {SUPPORTED_ARCHITECTURE} architecture is supported, actual {:?}",
                data.architecture
            )));
        }
        tracing::debug!(
            version = %data.version,
            layer_arrays = data.config.layers.len(),
            weights = data.weights.len(),
            "loaded model data"
        );
        Ok(data)
    }
}

impl Model {
    /// Loads a model from a `.nam` model-data file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = ModelData::from_file(path)?;
        Self::from_model_data(&data)
    }

    /// Builds a model from an already-parsed model-data document.
    pub fn from_model_data(data: &ModelData) -> Result<Self> {
        Self::new(&data.config, &mut WeightReader::new(&data.weights))
    }
}
