use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_svm::{Svm, SvmError};
use ndarray::{Array1, Array2, Axis};

use crate::data::utils::count_levels;

/// One binary machine of the one-vs-one ensemble.
struct PairMachine {
    positive: usize,
    negative: usize,
    model: Svm<f64, bool>,
}

/// Linear-kernel C-SVC over any number of levels.
///
/// Two levels train a single machine. More levels train one machine per pair
/// and predict by majority vote, ties going to the lower level index.
pub struct LinearSvc {
    machines: Vec<PairMachine>,
    n_levels: usize,
}

impl LinearSvc {
    /// Fit on `x` (trials × features) against level codes `y`.
    ///
    /// `weights[level]` scales the cost `C` for that level's margin violations.
    /// Fails with a reason when a level is missing from `y` or the solver fails.
    pub fn fit(
        x: &Array2<f64>,
        y: &[usize],
        levels: &[String],
        weights: &[f64],
        cost: f64,
    ) -> Result<Self, String> {
        let n_levels = levels.len();
        let counts = count_levels(y, n_levels);
        if let Some(missing) = counts.iter().position(|&c| c == 0) {
            return Err(format!(
                "training set has no trials labelled '{}'",
                levels[missing]
            ));
        }

        let mut machines = Vec::with_capacity(n_levels * n_levels.saturating_sub(1) / 2);
        for positive in 0..n_levels {
            for negative in positive + 1..n_levels {
                let rows: Vec<usize> = y
                    .iter()
                    .enumerate()
                    .filter(|&(_, &code)| code == positive || code == negative)
                    .map(|(i, _)| i)
                    .collect();
                let records = x.select(Axis(0), &rows);
                let targets: Array1<bool> = rows.iter().map(|&i| y[i] == positive).collect();
                let dataset = Dataset::new(records, targets);

                let fitted: Result<Svm<f64, bool>, SvmError> = Svm::<f64, bool>::params()
                    .pos_neg_weights(cost * weights[positive], cost * weights[negative])
                    .linear_kernel()
                    .fit(&dataset);
                let model = fitted.map_err(|e| {
                    format!(
                        "SVM for '{}' vs '{}' failed: {}",
                        levels[positive], levels[negative], e
                    )
                })?;

                machines.push(PairMachine {
                    positive,
                    negative,
                    model,
                });
            }
        }

        Ok(LinearSvc { machines, n_levels })
    }

    /// Predicted level code for every row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        let mut votes = Array2::<usize>::zeros((x.nrows(), self.n_levels));
        for machine in &self.machines {
            let predicted: Array1<bool> = machine.model.predict(x);
            for (row, &is_positive) in predicted.iter().enumerate() {
                let winner = if is_positive {
                    machine.positive
                } else {
                    machine.negative
                };
                votes[[row, winner]] += 1;
            }
        }

        votes
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (level, &count) in row.iter().enumerate() {
                    if count > row[best] {
                        best = level;
                    }
                }
                best
            })
            .collect()
    }
}
