//! Build settings and split strategies.
//!
//! The split strategy decides where along an axis a node is cut. Different
//! strategies trade build time against tree quality:
//! - [`SplitAlgorithm::MeanExtent`] is O(1) per axis
//! - the median strategies sort once per axis
//! - [`SplitAlgorithm::Sah`] minimizes an estimated traversal cost

use std::fmt;

use crate::{Result, TreeError};

/// Strategy for choosing the split coordinate along a candidate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitAlgorithm {
    /// Split at the center of the node's bounds.
    MeanExtent,
    /// Split where the cumulative triangle area, ordered by upper extent,
    /// crosses half of the total.
    MedianArea,
    /// Split at the upper extent of the middle poly by count.
    MedianCount,
    /// Surface-area heuristic. Small nodes evaluate every distinct poly
    /// boundary; larger nodes use a sorted prefix/suffix sweep.
    #[default]
    Sah,
}

impl SplitAlgorithm {
    /// All strategies, in declaration order.
    pub const ALL: [SplitAlgorithm; 4] = [
        SplitAlgorithm::MeanExtent,
        SplitAlgorithm::MedianArea,
        SplitAlgorithm::MedianCount,
        SplitAlgorithm::Sah,
    ];

    /// Human-readable name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            SplitAlgorithm::MeanExtent => "Mean extent",
            SplitAlgorithm::MedianArea => "Median area",
            SplitAlgorithm::MedianCount => "Median count",
            SplitAlgorithm::Sah => "SAH",
        }
    }
}

impl fmt::Display for SplitAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cost-model constants for [`SplitAlgorithm::Sah`].
///
/// The defaults are empirically tuned; treat them as starting points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SahParams {
    /// Cost of one bounding-box test.
    pub box_cost: f32,
    /// Cost of one triangle test, scaled by the child/parent area ratio.
    pub tri_cost: f32,
    /// Fast sweep only: weight of the squared distance, in polys, of a
    /// candidate from the median index.
    pub balance_bias: f32,
    /// Fast sweep only: penalty added when either side would receive fewer
    /// than `min_side_fraction` of the polys.
    pub small_side_penalty: f32,
    /// Fast sweep only: minimum share of polys per side before
    /// `small_side_penalty` applies.
    pub min_side_fraction: f32,
}

impl Default for SahParams {
    fn default() -> Self {
        Self {
            box_cost: 5.0,
            tri_cost: 1.0,
            balance_bias: 0.1,
            small_side_penalty: 100.0,
            min_side_fraction: 0.2,
        }
    }
}

/// Settings controlling how a tree is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Nodes with at most this many polys become leaves without splitting.
    pub values_per_leaf: usize,
    /// How split coordinates are chosen.
    pub algorithm: SplitAlgorithm,
    /// Straddling triangles whose area exceeds this fraction of the node's
    /// surface area stay at the node instead of being clipped into both children.
    pub max_area_fraction: f32,
    /// With [`SplitAlgorithm::Sah`], nodes with at most this many polys
    /// evaluate every candidate plane exactly.
    pub accurate_sah_count_threshold: usize,
    /// A split is rejected when the children together hold more than this
    /// multiple of the parent's poly count.
    pub max_growth: f32,
    /// Cost-model constants for [`SplitAlgorithm::Sah`].
    pub sah: SahParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values_per_leaf: 5,
            algorithm: SplitAlgorithm::Sah,
            max_area_fraction: 0.5,
            accurate_sah_count_threshold: 20,
            max_growth: 1.8,
            sah: SahParams::default(),
        }
    }
}

impl Settings {
    /// Sets the leaf-size threshold.
    pub fn with_values_per_leaf(mut self, values_per_leaf: usize) -> Self {
        self.values_per_leaf = values_per_leaf;
        self
    }

    /// Sets the split strategy.
    pub fn with_algorithm(mut self, algorithm: SplitAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the fraction of node surface area above which straddling
    /// triangles are not clipped.
    pub fn with_max_area_fraction(mut self, max_area_fraction: f32) -> Self {
        self.max_area_fraction = max_area_fraction;
        self
    }

    /// Sets the node size up to which SAH evaluates candidates exactly.
    pub fn with_accurate_sah_count_threshold(mut self, threshold: usize) -> Self {
        self.accurate_sah_count_threshold = threshold;
        self
    }

    /// Sets the SAH cost-model constants.
    pub fn with_sah(mut self, sah: SahParams) -> Self {
        self.sah = sah;
        self
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.values_per_leaf == 0 {
            return Err(TreeError::InvalidSettings(
                "values_per_leaf must be at least 1".into(),
            ));
        }
        if !(self.max_area_fraction.is_finite() && self.max_area_fraction > 0.0) {
            return Err(TreeError::InvalidSettings(format!(
                "max_area_fraction must be positive and finite, got {}",
                self.max_area_fraction
            )));
        }
        if !(self.max_growth.is_finite() && self.max_growth >= 1.0) {
            return Err(TreeError::InvalidSettings(format!(
                "max_growth must be finite and at least 1, got {}",
                self.max_growth
            )));
        }
        let sah = &self.sah;
        let finite = [
            sah.box_cost,
            sah.tri_cost,
            sah.balance_bias,
            sah.small_side_penalty,
            sah.min_side_fraction,
        ]
        .iter()
        .all(|c| c.is_finite() && *c >= 0.0);
        if !finite || sah.min_side_fraction > 0.5 {
            return Err(TreeError::InvalidSettings(format!(
                "SAH parameters must be finite and non-negative with min_side_fraction <= 0.5, got {sah:?}"
            )));
        }
        Ok(())
    }
}
