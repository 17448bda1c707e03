//! Split-half sign consistency.
//!
//! A subject's trials are split at random into two halves. Within each half the
//! reference condition is compared with the rest through the configured
//! [`Summary`], and the split scores 1 when both halves agree on the sign of
//! the difference, 0 otherwise. The statistic is the mean score over splits,
//! which measures how reliably the subject's effect direction replicates
//! regardless of what that direction is.

use crate::data::TrialTable;
use crate::error::EstimatorError;
use crate::estimation::params::SignConsistencyParams;
use crate::estimation::summary::Summary;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitOutcome {
    Consistent { attempts: usize },
    Inconsistent { attempts: usize },
    /// Every draw was invalid; excluded from the statistic.
    Exhausted,
}

impl SplitOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            SplitOutcome::Consistent { .. } => Some(1.0),
            SplitOutcome::Inconsistent { .. } => Some(0.0),
            SplitOutcome::Exhausted => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignConsistencyResult {
    /// Mean agreement over valid splits; `None` when no split was valid.
    pub statistic: Option<f64>,
    pub splits: Vec<SplitOutcome>,
    /// Indices of splits that ran out of resampling attempts.
    pub exhausted_splits: Vec<usize>,
}

impl SignConsistencyResult {
    pub fn valid_splits(&self) -> usize {
        self.splits.len() - self.exhausted_splits.len()
    }

    /// No split was measurable. Treat as missing, never as zero consistency.
    pub fn is_undefined(&self) -> bool {
        self.statistic.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    fn of(value: f64) -> Option<Sign> {
        match value.partial_cmp(&0.0)? {
            Ordering::Less => Some(Sign::Negative),
            Ordering::Equal => Some(Sign::Zero),
            Ordering::Greater => Some(Sign::Positive),
        }
    }
}

/// One random bipartition, before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitDraw {
    Valid { agree: bool },
    Invalid,
}

/// Compute the sign-consistency statistic of one subject.
///
/// The first label observed in `trials` is the reference condition; every
/// other label counts as the non-reference condition. Each split draws up to
/// `max_resampling_attempts` bipartitions until one has both conditions
/// represented in both halves.
///
/// # Errors
///
/// `DependentVariableCount` unless the table has exactly one dependent variable.
pub fn sign_consistency<R>(
    trials: &TrialTable,
    params: &SignConsistencyParams,
    rng: &mut R,
) -> anyhow::Result<SignConsistencyResult>
where
    R: Rng + ?Sized,
{
    if trials.n_features() != 1 {
        return Err(EstimatorError::DependentVariableCount {
            expected: 1,
            got: trials.n_features(),
        }
        .into());
    }

    let values = trials.dv_column(0).to_vec();
    let labels = trials.labels();
    let reference = &labels[0];
    let is_reference: Vec<bool> = labels.iter().map(|label| label == reference).collect();

    let n = values.len();
    let half = (n as f64 / 2.0).round_ties_even() as usize;
    let mut order: Vec<usize> = (0..n).collect();

    let mut splits = Vec::with_capacity(params.split_count());
    let mut exhausted_splits = Vec::new();

    for split in 0..params.split_count() {
        let mut outcome = SplitOutcome::Exhausted;
        for attempt in 1..=params.max_resampling_attempts() {
            order.shuffle(rng);
            let (group_a, group_b) = order.split_at(half);
            match draw_split(group_a, group_b, &values, &is_reference, params.summary()) {
                SplitDraw::Valid { agree: true } => {
                    outcome = SplitOutcome::Consistent { attempts: attempt };
                    break;
                }
                SplitDraw::Valid { agree: false } => {
                    outcome = SplitOutcome::Inconsistent { attempts: attempt };
                    break;
                }
                SplitDraw::Invalid => {}
            }
        }

        if outcome == SplitOutcome::Exhausted {
            log::warn!(
                "Split {} of subject '{}' found no valid half-split in {} attempts; excluding it",
                split,
                trials.subject(),
                params.max_resampling_attempts()
            );
            exhausted_splits.push(split);
        }
        splits.push(outcome);
    }

    let scores: Vec<f64> = splits.iter().filter_map(SplitOutcome::score).collect();
    let statistic = if scores.is_empty() {
        log::warn!(
            "Sign consistency of subject '{}' is undefined: all {} splits were exhausted",
            trials.subject(),
            splits.len()
        );
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    log::debug!(
        "Subject '{}': sign consistency {:?} over {} valid of {} splits",
        trials.subject(),
        statistic,
        scores.len(),
        splits.len()
    );

    Ok(SignConsistencyResult {
        statistic,
        splits,
        exhausted_splits,
    })
}

fn draw_split(
    group_a: &[usize],
    group_b: &[usize],
    values: &[f64],
    is_reference: &[bool],
    summary: &Summary,
) -> SplitDraw {
    match (
        group_sign(group_a, values, is_reference, summary),
        group_sign(group_b, values, is_reference, summary),
    ) {
        (Some(a), Some(b)) => SplitDraw::Valid { agree: a == b },
        _ => SplitDraw::Invalid,
    }
}

/// Sign of `summary(reference) - summary(non-reference)` within one half.
fn group_sign(
    group: &[usize],
    values: &[f64],
    is_reference: &[bool],
    summary: &Summary,
) -> Option<Sign> {
    let (reference, other): (Vec<usize>, Vec<usize>) =
        group.iter().partition(|&&i| is_reference[i]);
    let reference: Vec<f64> = reference.into_iter().map(|i| values[i]).collect();
    let other: Vec<f64> = other.into_iter().map(|i| values[i]).collect();

    let difference = summary.apply(&reference)? - summary.apply(&other)?;
    Sign::of(difference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seeded_rng;
    use ndarray::Array2;

    fn table(values: &[f64], labels: &[&str]) -> TrialTable {
        let features = Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap();
        let labels = labels.iter().map(|l| l.to_string()).collect();
        TrialTable::new("s1", features, labels).unwrap()
    }

    #[test]
    fn sign_of_difference() {
        assert_eq!(Sign::of(2.0), Some(Sign::Positive));
        assert_eq!(Sign::of(-0.1), Some(Sign::Negative));
        assert_eq!(Sign::of(0.0), Some(Sign::Zero));
        assert_eq!(Sign::of(f64::NAN), None);
    }

    #[test]
    fn half_with_single_condition_is_invalid() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let is_reference = [true, true, false, false];
        let draw = draw_split(&[0, 1], &[2, 3], &values, &is_reference, &Summary::Mean);
        assert_eq!(draw, SplitDraw::Invalid);

        let draw = draw_split(&[0, 2], &[1, 3], &values, &is_reference, &Summary::Mean);
        assert_eq!(draw, SplitDraw::Valid { agree: true });

        let values = [5.0, 2.0, 3.0, 4.0];
        let draw = draw_split(&[0, 2], &[1, 3], &values, &is_reference, &Summary::Mean);
        assert_eq!(draw, SplitDraw::Valid { agree: false });
    }

    #[test]
    fn reference_is_first_observed_label() {
        // "b" comes first, so the reference mean (b) is lower in every half.
        let t = table(&[0.0, 10.0, 1.0, 11.0, 2.0, 12.0], &["b", "a", "b", "a", "b", "a"]);
        let params = SignConsistencyParams::new(50, 100, Summary::Mean).unwrap();
        let result = sign_consistency(&t, &params, &mut seeded_rng(3)).unwrap();
        assert_eq!(result.statistic, Some(1.0));
    }

    #[test]
    fn multiple_dependent_variables_are_rejected() {
        let features = Array2::zeros((4, 2));
        let labels = ["a", "b", "a", "b"].iter().map(|l| l.to_string()).collect();
        let t = TrialTable::new("s1", features, labels).unwrap();
        let params = SignConsistencyParams::new(5, 5, Summary::Mean).unwrap();
        let err = sign_consistency(&t, &params, &mut seeded_rng(0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::DependentVariableCount { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn exhausted_split_logs_warning() {
        testing_logger::setup();
        // One "a" trial: whichever half lacks it has no reference condition.
        let t = table(&[5.0, 1.0, 2.0, 3.0], &["a", "b", "b", "b"]);
        let params = SignConsistencyParams::new(2, 3, Summary::Mean).unwrap();
        let result = sign_consistency(&t, &params, &mut seeded_rng(1)).unwrap();
        assert_eq!(result.exhausted_splits, vec![0, 1]);

        testing_logger::validate(|captured| {
            let warnings: Vec<&str> = captured
                .iter()
                .filter(|entry| entry.level == log::Level::Warn)
                .map(|entry| entry.body.as_str())
                .collect();
            assert_eq!(warnings.len(), 3, "warnings: {:?}", warnings);
            assert!(warnings[0].starts_with("Split 0 of subject 's1'"));
            assert!(warnings[0].contains("3 attempts"));
            assert!(warnings[1].starts_with("Split 1 of subject 's1'"));
            assert!(warnings[2].contains("undefined"));
        });
    }

    #[test]
    fn attempts_are_recorded() {
        let t = table(&[10.0, 11.0, 0.0, 1.0], &["a", "a", "b", "b"]);
        let params = SignConsistencyParams::new(30, 50, Summary::Mean).unwrap();
        let result = sign_consistency(&t, &params, &mut seeded_rng(9)).unwrap();
        for outcome in &result.splits {
            match outcome {
                SplitOutcome::Consistent { attempts } => assert!((1..=50).contains(attempts)),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }
}
