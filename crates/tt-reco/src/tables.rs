//! Density tables consumed by the likelihood ranker and their on-disk format.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::serde::from_json_slice;
use tt_core::{BinnedAxis, Density1D, Density2D};

/// Raw table as stored in a density file; normalised when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableSpec {
    /// Two-dimensional table with `contents[ix][iy]`.
    TwoDim {
        /// Edges of the first axis.
        x_edges: Vec<f64>,
        /// Edges of the second axis.
        y_edges: Vec<f64>,
        /// Raw bin contents.
        contents: Vec<Vec<f64>>,
    },
    /// One-dimensional table.
    OneDim {
        /// Bin edges.
        edges: Vec<f64>,
        /// Raw bin contents.
        contents: Vec<f64>,
    },
}

/// Named tables of a density file.
pub type TableFile = BTreeMap<String, TableSpec>;

fn table_error(code: &str, message: &str, name: &str) -> RecoError {
    RecoError::Config(ErrorInfo::new(code, message).with_context("table", name))
}

fn with_table(err: RecoError, name: &str) -> RecoError {
    match err {
        RecoError::Density(info) => RecoError::Density(info.with_context("table", name)),
        other => other,
    }
}

/// One-dimensional density over the neutrino distance and two-dimensional density over
/// (hadronic W mass, hadronic top mass).
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodTables {
    /// Density of the neutrino solver distance.
    pub neutrino: Density1D,
    /// Joint density of hadronic W and top masses.
    pub mass: Density2D,
}

impl LikelihoodTables {
    /// Creates the tables from already normalised densities.
    pub fn new(neutrino: Density1D, mass: Density2D) -> Self {
        Self { neutrino, mass }
    }

    /// Picks and normalises the named tables from a parsed density file.
    pub fn from_file(
        file: &TableFile,
        neutrino_table: &str,
        mass_table: &str,
    ) -> Result<Self, RecoError> {
        let neutrino = match file.get(neutrino_table) {
            Some(TableSpec::OneDim { edges, contents }) => {
                let axis = BinnedAxis::new(edges.clone())
                    .map_err(|err| with_table(err, neutrino_table))?;
                Density1D::from_contents(axis, contents.clone())
                    .map_err(|err| with_table(err, neutrino_table))?
            }
            Some(TableSpec::TwoDim { .. }) => {
                return Err(table_error(
                    "table_dimension",
                    "expected a one-dimensional table",
                    neutrino_table,
                ));
            }
            None => {
                return Err(table_error(
                    "missing_table",
                    "density table not found",
                    neutrino_table,
                ));
            }
        };
        let mass = match file.get(mass_table) {
            Some(TableSpec::TwoDim {
                x_edges,
                y_edges,
                contents,
            }) => {
                let x_axis = BinnedAxis::new(x_edges.clone())
                    .map_err(|err| with_table(err, mass_table))?;
                let y_axis = BinnedAxis::new(y_edges.clone())
                    .map_err(|err| with_table(err, mass_table))?;
                Density2D::from_contents(x_axis, y_axis, contents.clone())
                    .map_err(|err| with_table(err, mass_table))?
            }
            Some(TableSpec::OneDim { .. }) => {
                return Err(table_error(
                    "table_dimension",
                    "expected a two-dimensional table",
                    mass_table,
                ));
            }
            None => {
                return Err(table_error(
                    "missing_table",
                    "density table not found",
                    mass_table,
                ));
            }
        };
        Ok(Self { neutrino, mass })
    }

    /// Reads a JSON density file and extracts the named tables.
    pub fn load(path: &Path, neutrino_table: &str, mass_table: &str) -> Result<Self, RecoError> {
        let bytes = fs::read(path).map_err(|err| {
            RecoError::Config(
                ErrorInfo::new("tables_read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let file: TableFile = from_json_slice(&bytes)?;
        Self::from_file(&file, neutrino_table, mass_table)
    }
}
