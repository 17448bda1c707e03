//! Parameter bundles for the two estimators.
//!
//! Both bundles are immutable once built and carry no randomness; the same
//! bundle is reused for every subject and every permutation.

use crate::error::EstimatorError;
use crate::estimation::summary::Summary;
use serde::{Deserialize, Serialize};

/// Parameters of the sign-consistency estimator. All three values are required.
#[derive(Debug, Clone)]
pub struct SignConsistencyParams {
    split_count: usize,
    max_resampling_attempts: usize,
    summary: Summary,
}

impl SignConsistencyParams {
    /// # Arguments
    ///
    /// * `split_count` - Number of random half-splits averaged into the statistic
    /// * `max_resampling_attempts` - Draws allowed per split before it is given up
    /// * `summary` - Reduction applied to each condition within a half
    pub fn new(
        split_count: usize,
        max_resampling_attempts: usize,
        summary: Summary,
    ) -> anyhow::Result<Self> {
        if split_count == 0 {
            return Err(
                EstimatorError::invalid_parameter("split_count", "must be at least 1").into(),
            );
        }
        if max_resampling_attempts == 0 {
            return Err(EstimatorError::invalid_parameter(
                "max_resampling_attempts",
                "must be at least 1",
            )
            .into());
        }
        Ok(SignConsistencyParams {
            split_count,
            max_resampling_attempts,
            summary,
        })
    }

    pub fn split_count(&self) -> usize {
        self.split_count
    }

    pub fn max_resampling_attempts(&self) -> usize {
        self.max_resampling_attempts
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Number of cross-validation folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldCount {
    /// Size of the smallest label class, resolved per call.
    #[default]
    Auto,
    Fixed(usize),
}

impl FoldCount {
    /// Resolve against the smallest class size of the table at hand.
    pub fn resolve(self, smallest_class: usize) -> usize {
        match self {
            FoldCount::Auto => smallest_class,
            FoldCount::Fixed(k) => k,
        }
    }
}

/// Parameters of the classification-accuracy estimator.
///
/// Every way of building a bundle validates it, including deserialization, so
/// a bundle that exists is usable for any table whose classes are large enough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClassificationConfig")]
pub struct ClassificationParams {
    fold_count: FoldCount,
    handle_imbalance: bool,
    cost: f64,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        ClassificationParams {
            fold_count: FoldCount::Auto,
            handle_imbalance: true,
            cost: 1.0,
        }
    }
}

impl ClassificationParams {
    pub fn new(fold_count: FoldCount, handle_imbalance: bool) -> anyhow::Result<Self> {
        ClassificationParams {
            fold_count,
            handle_imbalance,
            ..Default::default()
        }
        .validated()
    }

    /// Use exactly `k` folds; `k` must be at least 2.
    pub fn with_fold_count(self, k: usize) -> anyhow::Result<Self> {
        ClassificationParams {
            fold_count: FoldCount::Fixed(k),
            ..self
        }
        .validated()
    }

    pub fn with_handle_imbalance(self, handle_imbalance: bool) -> Self {
        ClassificationParams {
            handle_imbalance,
            ..self
        }
    }

    /// Soft-margin cost `C` of the linear SVM; positive and finite.
    pub fn with_cost(self, cost: f64) -> anyhow::Result<Self> {
        ClassificationParams { cost, ..self }.validated()
    }

    pub fn fold_count(&self) -> FoldCount {
        self.fold_count
    }

    /// Weight each class by `min(count) / count` during training.
    pub fn handle_imbalance(&self) -> bool {
        self.handle_imbalance
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    // Fold counts against class sizes depend on the data and are checked per call.
    fn validated(self) -> anyhow::Result<Self> {
        if let FoldCount::Fixed(k) = self.fold_count {
            if k < 2 {
                return Err(EstimatorError::invalid_parameter(
                    "fold_count",
                    format!("at least 2 folds are required, got {k}"),
                )
                .into());
            }
        }
        if !(self.cost.is_finite() && self.cost > 0.0) {
            return Err(EstimatorError::invalid_parameter(
                "cost",
                format!("must be positive and finite, got {}", self.cost),
            )
            .into());
        }
        Ok(self)
    }
}

/// Serialized form of [`ClassificationParams`]; omitted fields take the defaults.
#[derive(Deserialize)]
#[serde(default)]
struct ClassificationConfig {
    fold_count: FoldCount,
    handle_imbalance: bool,
    cost: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let defaults = ClassificationParams::default();
        ClassificationConfig {
            fold_count: defaults.fold_count,
            handle_imbalance: defaults.handle_imbalance,
            cost: defaults.cost,
        }
    }
}

impl TryFrom<ClassificationConfig> for ClassificationParams {
    type Error = anyhow::Error;

    fn try_from(config: ClassificationConfig) -> anyhow::Result<Self> {
        ClassificationParams {
            fold_count: config.fold_count,
            handle_imbalance: config.handle_imbalance,
            cost: config.cost,
        }
        .validated()
    }
}
