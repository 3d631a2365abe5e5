//! YAML configuration of a reconstruction run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::serde::{from_yaml_slice, to_yaml_string};
use tt_core::stable_hash_string;

use crate::chi2::Chi2Settings;
use crate::likelihood::LikelihoodSettings;
use crate::selection::JetSelection;

fn config_error(code: &str, message: impl Into<String>) -> RecoError {
    RecoError::Config(ErrorInfo::new(code, message))
}

/// Ranking strategy and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RankerConfig {
    /// Chi-square ranking with the mass-constraint neutrino solver.
    Chi2(Chi2Settings),
    /// Likelihood ranking with the ellipse neutrino solver.
    Likelihood(LikelihoodSettings),
}

/// Full configuration of the reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoConfig {
    /// Jet selection applied before the search.
    #[serde(default)]
    pub selection: JetSelection,
    /// Ranking strategy.
    pub ranker: RankerConfig,
}

impl RecoConfig {
    /// Creates a configuration.
    pub fn new(selection: JetSelection, ranker: RankerConfig) -> Self {
        Self { selection, ranker }
    }

    /// Reads and validates a YAML configuration.
    ///
    /// A relative path to likelihood tables is resolved against the directory of the
    /// configuration file.
    pub fn load(path: &Path) -> Result<Self, RecoError> {
        let bytes = fs::read(path).map_err(|err| {
            RecoError::Config(
                ErrorInfo::new("config_read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let mut config: RecoConfig = from_yaml_slice(&bytes).map_err(|err| {
            RecoError::Config(
                ErrorInfo::new("config_parse", err.info().message.clone())
                    .with_context("path", path.display()),
            )
        })?;
        if let RankerConfig::Likelihood(settings) = &mut config.ranker {
            if settings.tables.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                settings.tables = base.join(&settings.tables);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as YAML.
    pub fn save(&self, path: &Path) -> Result<(), RecoError> {
        let yaml = to_yaml_string(self)?;
        fs::write(path, yaml).map_err(|err| RecoError::serde("config_write", err))
    }

    /// Checks thresholds and ranker settings.
    pub fn validate(&self) -> Result<(), RecoError> {
        let selection = &self.selection;
        if !selection.min_pt.is_finite() || selection.min_pt < 0.0 {
            return Err(config_error(
                "selection_min_pt",
                "min_pt must be finite and non-negative",
            ));
        }
        if !(selection.max_abs_eta > 0.0) {
            return Err(config_error(
                "selection_max_abs_eta",
                "max_abs_eta must be positive",
            ));
        }
        if let Some(b_tag) = &selection.b_tag {
            if !b_tag.threshold.is_finite() {
                return Err(config_error(
                    "selection_b_tag",
                    "b-tag threshold must be finite",
                ));
            }
        }
        match &self.ranker {
            RankerConfig::Chi2(settings) => settings.validate(),
            RankerConfig::Likelihood(settings) => settings.validate(),
        }
    }

    /// Stable SHA-256 hash of the configuration.
    pub fn stable_hash(&self) -> Result<String, RecoError> {
        stable_hash_string(self)
    }
}
