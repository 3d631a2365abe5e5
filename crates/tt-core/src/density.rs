//! Binned probability density tables with an explicit out-of-domain condition.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RecoError};

fn density_error(code: &str, message: impl Into<String>) -> RecoError {
    RecoError::density(code, message)
}

/// Position of a value relative to the bins of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisBin {
    /// Value lies below the lowest edge.
    Underflow,
    /// Value lies inside the bin with the given zero-based index.
    Bin(usize),
    /// Value lies at or above the highest edge, or is not a number.
    Overflow,
}

/// Result of a density lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DensityLookup {
    /// Value falls inside the domain; carries the probability density there.
    InRange(f64),
    /// Value falls outside the domain of the table.
    OutOfRange,
}

impl DensityLookup {
    /// Returns the density if the lookup was in range.
    pub fn in_range(self) -> Option<f64> {
        match self {
            DensityLookup::InRange(value) => Some(value),
            DensityLookup::OutOfRange => None,
        }
    }
}

/// Axis described by strictly increasing bin edges.
///
/// Bins are closed on the left and open on the right, so a value equal to the
/// highest edge is in overflow. Deserialization runs the same checks as
/// [`BinnedAxis::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxis")]
pub struct BinnedAxis {
    edges: Vec<f64>,
}

impl BinnedAxis {
    /// Creates an axis from explicit edges.
    pub fn new(edges: Vec<f64>) -> Result<Self, RecoError> {
        if edges.len() < 2 {
            return Err(RecoError::Density(
                ErrorInfo::new("axis_too_short", "an axis needs at least two edges")
                    .with_context("edges", edges.len()),
            ));
        }
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(density_error(
                "axis_non_finite",
                "axis edges must be finite",
            ));
        }
        if let Some(position) = edges.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(RecoError::Density(
                ErrorInfo::new(
                    "axis_not_increasing",
                    "axis edges must be strictly increasing",
                )
                .with_context("position", position + 1),
            ));
        }
        Ok(Self { edges })
    }

    /// Creates an axis with `bins` equal-width bins spanning `[low, high)`.
    pub fn uniform(bins: usize, low: f64, high: f64) -> Result<Self, RecoError> {
        if bins == 0 {
            return Err(density_error(
                "axis_no_bins",
                "an axis needs at least one bin",
            ));
        }
        let step = (high - low) / bins as f64;
        Self::new((0..=bins).map(|idx| low + idx as f64 * step).collect())
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lowest edge of the axis.
    pub fn low(&self) -> f64 {
        self.edges[0]
    }

    /// Highest edge of the axis.
    pub fn high(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Width of the bin with the given index.
    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    /// Locates the bin containing `value`.
    pub fn find_bin(&self, value: f64) -> AxisBin {
        if value.is_nan() || value >= self.high() {
            return AxisBin::Overflow;
        }
        if value < self.low() {
            return AxisBin::Underflow;
        }
        // First edge strictly greater than the value closes the containing bin.
        let upper = self.edges.partition_point(|edge| *edge <= value);
        AxisBin::Bin(upper - 1)
    }
}

fn check_contents(contents: &[f64]) -> Result<(), RecoError> {
    if let Some(position) = contents
        .iter()
        .position(|value| !value.is_finite() || *value < 0.0)
    {
        return Err(RecoError::Density(
            ErrorInfo::new(
                "invalid_content",
                "bin contents must be finite and non-negative",
            )
            .with_context("bin", position),
        ));
    }
    Ok(())
}

fn check_integral(integral: f64) -> Result<(), RecoError> {
    if !integral.is_finite() || integral <= 0.0 {
        return Err(RecoError::Density(
            ErrorInfo::new(
                "zero_integral",
                "table cannot be normalised to unit integral",
            )
            .with_context("integral", integral),
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawAxis {
    edges: Vec<f64>,
}

impl TryFrom<RawAxis> for BinnedAxis {
    type Error = RecoError;

    fn try_from(raw: RawAxis) -> Result<Self, Self::Error> {
        BinnedAxis::new(raw.edges)
    }
}

/// One-dimensional probability density normalised to unit integral over its domain.
///
/// Deserialized values are validated and renormalised like [`Density1D::from_contents`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDensity1D")]
pub struct Density1D {
    axis: BinnedAxis,
    values: Vec<f64>,
}

impl Density1D {
    /// Builds a density from raw bin contents, normalising them so that the sum of
    /// `content * width` equals one.
    pub fn from_contents(axis: BinnedAxis, contents: Vec<f64>) -> Result<Self, RecoError> {
        if contents.len() != axis.bins() {
            return Err(RecoError::Density(
                ErrorInfo::new(
                    "content_mismatch",
                    "number of contents differs from bins",
                )
                .with_context("bins", axis.bins())
                .with_context("contents", contents.len()),
            ));
        }
        check_contents(&contents)?;
        let integral: f64 = contents
            .iter()
            .enumerate()
            .map(|(bin, value)| value * axis.width(bin))
            .sum();
        check_integral(integral)?;
        let values = contents.into_iter().map(|value| value / integral).collect();
        Ok(Self { axis, values })
    }

    /// Axis of the table.
    pub fn axis(&self) -> &BinnedAxis {
        &self.axis
    }

    /// Normalised density in each bin.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Integral of the density over its domain (one up to rounding).
    pub fn integral(&self) -> f64 {
        self.values
            .iter()
            .enumerate()
            .map(|(bin, value)| value * self.axis.width(bin))
            .sum()
    }

    /// Looks up the density at `x`.
    pub fn density(&self, x: f64) -> DensityLookup {
        match self.axis.find_bin(x) {
            AxisBin::Bin(bin) => DensityLookup::InRange(self.values[bin]),
            AxisBin::Underflow | AxisBin::Overflow => DensityLookup::OutOfRange,
        }
    }
}

#[derive(Deserialize)]
struct RawDensity1D {
    axis: BinnedAxis,
    values: Vec<f64>,
}

impl TryFrom<RawDensity1D> for Density1D {
    type Error = RecoError;

    fn try_from(raw: RawDensity1D) -> Result<Self, Self::Error> {
        Density1D::from_contents(raw.axis, raw.values)
    }
}

/// Two-dimensional probability density normalised to unit integral over its domain.
///
/// Deserialized values are validated and renormalised like [`Density2D::from_contents`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDensity2D")]
pub struct Density2D {
    x_axis: BinnedAxis,
    y_axis: BinnedAxis,
    /// Row-major storage: `values[ix * ny + iy]`.
    values: Vec<f64>,
}

impl Density2D {
    /// Builds a density from raw bin contents indexed as `contents[ix][iy]`.
    pub fn from_contents(
        x_axis: BinnedAxis,
        y_axis: BinnedAxis,
        contents: Vec<Vec<f64>>,
    ) -> Result<Self, RecoError> {
        if contents.len() != x_axis.bins() {
            return Err(RecoError::Density(
                ErrorInfo::new(
                    "content_mismatch",
                    "number of rows differs from x bins",
                )
                .with_context("bins", x_axis.bins())
                .with_context("rows", contents.len()),
            ));
        }
        if let Some(row) = contents.iter().position(|row| row.len() != y_axis.bins()) {
            return Err(RecoError::Density(
                ErrorInfo::new("content_mismatch", "row length differs from y bins")
                    .with_context("bins", y_axis.bins())
                    .with_context("row", row),
            ));
        }
        let flat: Vec<f64> = contents.into_iter().flatten().collect();
        check_contents(&flat)?;
        let ny = y_axis.bins();
        let integral: f64 = flat
            .iter()
            .enumerate()
            .map(|(idx, value)| value * x_axis.width(idx / ny) * y_axis.width(idx % ny))
            .sum();
        check_integral(integral)?;
        let values = flat.into_iter().map(|value| value / integral).collect();
        Ok(Self {
            x_axis,
            y_axis,
            values,
        })
    }

    /// Axis of the first argument.
    pub fn x_axis(&self) -> &BinnedAxis {
        &self.x_axis
    }

    /// Axis of the second argument.
    pub fn y_axis(&self) -> &BinnedAxis {
        &self.y_axis
    }

    /// Integral of the density over its domain (one up to rounding).
    pub fn integral(&self) -> f64 {
        let ny = self.y_axis.bins();
        self.values
            .iter()
            .enumerate()
            .map(|(idx, value)| value * self.x_axis.width(idx / ny) * self.y_axis.width(idx % ny))
            .sum()
    }

    /// Looks up the density at `(x, y)`; out of range if either coordinate is.
    pub fn density(&self, x: f64, y: f64) -> DensityLookup {
        match (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            (AxisBin::Bin(ix), AxisBin::Bin(iy)) => {
                DensityLookup::InRange(self.values[ix * self.y_axis.bins() + iy])
            }
            _ => DensityLookup::OutOfRange,
        }
    }
}

#[derive(Deserialize)]
struct RawDensity2D {
    x_axis: BinnedAxis,
    y_axis: BinnedAxis,
    values: Vec<f64>,
}

impl TryFrom<RawDensity2D> for Density2D {
    type Error = RecoError;

    fn try_from(raw: RawDensity2D) -> Result<Self, Self::Error> {
        let rows = raw
            .values
            .chunks(raw.y_axis.bins())
            .map(<[f64]>::to_vec)
            .collect();
        Density2D::from_contents(raw.x_axis, raw.y_axis, rows)
    }
}
