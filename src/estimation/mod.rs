use crate::data::{TrialFrame, TrialTable};
use crate::seed::seeded_rng;
use rand::Rng;

pub mod classification;
pub mod params;
pub mod sign_consistency;
pub mod summary;

pub use classification::{ClassificationResult, LabelHits, classification_accuracy};
pub use params::{ClassificationParams, FoldCount, SignConsistencyParams};
pub use sign_consistency::{SignConsistencyResult, SplitOutcome, sign_consistency};
pub use summary::Summary;

/// Scalar produced for one subject under one permutation.
pub trait SubjectStatistic {
    /// `None` when the statistic is undefined for this subject.
    fn value(&self) -> Option<f64>;
}

impl SubjectStatistic for SignConsistencyResult {
    fn value(&self) -> Option<f64> {
        self.statistic
    }
}

impl SubjectStatistic for ClassificationResult {
    fn value(&self) -> Option<f64> {
        Some(self.accuracy)
    }
}

/// A per-subject estimator, selected by its parameter bundle.
///
/// The orchestrator calls one estimator per subject and per permutation; each
/// call owns its random stream.
pub trait SubjectEstimator {
    type Output: SubjectStatistic;

    fn estimate<R>(&self, trials: &TrialTable, rng: &mut R) -> anyhow::Result<Self::Output>
    where
        R: Rng + ?Sized;

    /// Run with a fresh stream seeded from `seed`.
    fn estimate_seeded(&self, trials: &TrialTable, seed: u64) -> anyhow::Result<Self::Output> {
        let mut rng = seeded_rng(seed);
        self.estimate(trials, &mut rng)
    }
}

impl SubjectEstimator for SignConsistencyParams {
    type Output = SignConsistencyResult;

    fn estimate<R>(&self, trials: &TrialTable, rng: &mut R) -> anyhow::Result<Self::Output>
    where
        R: Rng + ?Sized,
    {
        sign_consistency(trials, self, rng)
    }
}

impl SubjectEstimator for ClassificationParams {
    type Output = ClassificationResult;

    fn estimate<R>(&self, trials: &TrialTable, rng: &mut R) -> anyhow::Result<Self::Output>
    where
        R: Rng + ?Sized,
    {
        classification_accuracy(trials, self, rng)
    }
}

/// Sign consistency of the columns named `idv`, `dv` and `iv` in `frame`.
pub fn sign_consistency_from_frame<R>(
    frame: &TrialFrame,
    idv: &str,
    dv: &str,
    iv: &str,
    params: &SignConsistencyParams,
    rng: &mut R,
) -> anyhow::Result<SignConsistencyResult>
where
    R: Rng + ?Sized,
{
    let trials = TrialTable::from_frame(frame, idv, &[dv], iv)?;
    sign_consistency(&trials, params, rng)
}

/// Classification accuracy of the columns named `idv`, `dv` and `iv` in `frame`.
pub fn classification_accuracy_from_frame<R>(
    frame: &TrialFrame,
    idv: &str,
    dv: &[&str],
    iv: &str,
    params: &ClassificationParams,
    rng: &mut R,
) -> anyhow::Result<ClassificationResult>
where
    R: Rng + ?Sized,
{
    let trials = TrialTable::from_frame(frame, idv, dv, iv)?;
    classification_accuracy(&trials, params, rng)
}
