//! Cross-validated classification accuracy.
//!
//! A linear support-vector classifier is trained per stratified fold to predict
//! the condition label from the dependent variables; the statistic is the mean
//! held-out accuracy. Folds are trained in parallel.

use crate::data::TrialTable;
use crate::data::utils::{count_levels, get_level_indices};
use crate::error::EstimatorError;
use crate::estimation::params::ClassificationParams;
use rand::Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use std::collections::BTreeMap;

pub mod folds;
pub mod svm;

use folds::{Fold, stratified_folds};
use svm::LinearSvc;

/// Held-out predictions of one label, pooled over folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LabelHits {
    pub correct: usize,
    pub total: usize,
}

impl LabelHits {
    pub fn recall(&self) -> f64 {
        if self.total == 0 {
            f64::NAN
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Mean held-out accuracy across folds.
    pub accuracy: f64,
    pub fold_count: usize,
    pub fold_accuracies: Vec<f64>,
    pub class_weights: BTreeMap<String, f64>,
    pub label_hits: BTreeMap<String, LabelHits>,
}

/// Per-level training weights: `min(count) / count`, or all ones.
pub fn class_weights(counts: &[usize], handle_imbalance: bool) -> Vec<f64> {
    if !handle_imbalance {
        return vec![1.0; counts.len()];
    }
    let smallest = counts.iter().copied().min().unwrap_or(0) as f64;
    counts.iter().map(|&c| smallest / c as f64).collect()
}

/// Compute the cross-validated classification accuracy of one subject.
///
/// # Errors
///
/// * `TooFewLabels` - fewer than two labels in the table
/// * `TooFewTrialsPerLabel` - the smallest label has a single trial
/// * `FoldCountExceedsClassSize` - a fixed fold count above the smallest class
/// * `DegenerateFold` - a fold could not be trained or evaluated
pub fn classification_accuracy<R>(
    trials: &TrialTable,
    params: &ClassificationParams,
    rng: &mut R,
) -> anyhow::Result<ClassificationResult>
where
    R: Rng + ?Sized,
{
    let levels = trials.levels();
    if levels.len() < 2 {
        return Err(EstimatorError::TooFewLabels(levels.len()).into());
    }
    let codes = trials.label_codes(&levels);
    let counts = count_levels(&codes, levels.len());

    let (smallest_level, &smallest) = counts
        .iter()
        .enumerate()
        .min_by_key(|&(_, count)| *count)
        .ok_or(EstimatorError::EmptyTable)?;
    if smallest < 2 {
        return Err(EstimatorError::TooFewTrialsPerLabel {
            label: levels[smallest_level].clone(),
            count: smallest,
            required: 2,
        }
        .into());
    }

    let k = params.fold_count().resolve(smallest);
    if k > smallest {
        return Err(EstimatorError::FoldCountExceedsClassSize {
            fold_count: k,
            label: levels[smallest_level].clone(),
            class_size: smallest,
        }
        .into());
    }

    let weights = class_weights(&counts, params.handle_imbalance());
    let folds = stratified_folds(&get_level_indices(&codes, levels.len()), k, rng);

    let evaluated: Vec<FoldEvaluation> = folds
        .into_par_iter()
        .enumerate()
        .map(|(fold_idx, fold)| {
            evaluate_fold(trials, &codes, &levels, &weights, params.cost(), fold_idx, &fold)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let fold_accuracies: Vec<f64> = evaluated.iter().map(|e| e.accuracy).collect();
    let accuracy = fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;

    let mut label_hits: BTreeMap<String, LabelHits> = BTreeMap::new();
    for evaluation in &evaluated {
        for (level, hits) in evaluation.hits.iter().enumerate() {
            let entry = label_hits.entry(levels[level].clone()).or_default();
            entry.correct += hits.correct;
            entry.total += hits.total;
        }
    }

    log::debug!(
        "Subject '{}': {}-fold accuracy {:.4} (imbalance weighting: {})",
        trials.subject(),
        k,
        accuracy,
        params.handle_imbalance()
    );

    Ok(ClassificationResult {
        accuracy,
        fold_count: k,
        fold_accuracies,
        class_weights: levels.iter().cloned().zip(weights).collect(),
        label_hits,
    })
}

struct FoldEvaluation {
    accuracy: f64,
    hits: Vec<LabelHits>,
}

fn evaluate_fold(
    trials: &TrialTable,
    codes: &[usize],
    levels: &[String],
    weights: &[f64],
    cost: f64,
    fold_idx: usize,
    fold: &Fold,
) -> anyhow::Result<FoldEvaluation> {
    let degenerate = |reason: String| EstimatorError::DegenerateFold {
        fold: fold_idx,
        reason,
    };

    if fold.test.is_empty() {
        return Err(degenerate("no held-out trials".to_string()).into());
    }

    let x_train = trials.features().select(ndarray::Axis(0), &fold.train);
    let y_train: Vec<usize> = fold.train.iter().map(|&i| codes[i]).collect();
    let svc = LinearSvc::fit(&x_train, &y_train, levels, weights, cost).map_err(degenerate)?;

    let x_test = trials.features().select(ndarray::Axis(0), &fold.test);
    let predicted = svc.predict(&x_test);

    let mut hits = vec![LabelHits::default(); levels.len()];
    for (&idx, &guess) in fold.test.iter().zip(&predicted) {
        let truth = codes[idx];
        hits[truth].total += 1;
        if guess == truth {
            hits[truth].correct += 1;
        }
    }
    let correct: usize = hits.iter().map(|h| h.correct).sum();

    Ok(FoldEvaluation {
        accuracy: correct as f64 / fold.test.len() as f64,
        hits,
    })
}
