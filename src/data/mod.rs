//! Per-subject trial tables.
//!
//! A [`TrialFrame`] holds loosely typed named columns as an orchestrator
//! assembles them. [`TrialTable::from_frame`] resolves the subject, dependent
//! and independent columns by name once, checks their shapes, and produces the
//! strongly typed table every estimator consumes.

use crate::error::EstimatorError;
use ndarray::{Array2, ArrayView1, Axis};
use num_traits::ToPrimitive;

pub mod utils;

use utils::{count_levels, encode_labels, extract_levels};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values as labels; numeric codes are formatted.
    pub fn to_labels(&self) -> Vec<String> {
        match self {
            Column::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
            Column::Categorical(values) => values.clone(),
        }
    }
}

/// Named columns for one subject, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TrialFrame {
    columns: Vec<(String, Column)>,
}

impl TrialFrame {
    pub fn new() -> Self {
        TrialFrame::default()
    }

    /// Add (or replace) a numeric column. Values that cannot be represented as
    /// `f64` become `NaN`, which table construction rejects.
    pub fn with_numeric<T, I>(self, name: &str, values: I) -> Self
    where
        T: ToPrimitive,
        I: IntoIterator<Item = T>,
    {
        let values = values
            .into_iter()
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        self.with_column(name, Column::Numeric(values))
    }

    /// Add (or replace) a categorical column.
    pub fn with_categorical<S, I>(self, name: &str, values: I) -> Self
    where
        S: ToString,
        I: IntoIterator<Item = S>,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.with_column(name, Column::Categorical(values))
    }

    pub fn with_column(mut self, name: &str, column: Column) -> Self {
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    fn require(&self, name: &str) -> Result<&Column, EstimatorError> {
        self.column(name)
            .ok_or_else(|| EstimatorError::MissingColumn(name.to_string()))
    }
}

/// One subject's trials: a dense dependent-variable block and one label per row.
#[derive(Debug, Clone)]
pub struct TrialTable {
    subject: String,
    dv_names: Vec<String>,
    iv_name: String,
    features: Array2<f64>,
    labels: Vec<String>,
}

impl TrialTable {
    /// Build a table directly from a feature matrix (trials × dependent variables)
    /// and the matching labels.
    pub fn new(
        subject: impl Into<String>,
        features: Array2<f64>,
        labels: Vec<String>,
    ) -> anyhow::Result<Self> {
        if features.nrows() != labels.len() {
            return Err(EstimatorError::DimensionMismatch {
                dv_rows: features.nrows(),
                iv_rows: labels.len(),
            }
            .into());
        }
        if labels.is_empty() {
            return Err(EstimatorError::EmptyTable.into());
        }

        let dv_names: Vec<String> = (0..features.ncols()).map(|j| format!("dv{j}")).collect();
        ensure_finite(&features, &dv_names)?;
        Ok(TrialTable {
            subject: subject.into(),
            dv_names,
            iv_name: "iv".to_string(),
            features,
            labels,
        })
    }

    /// Resolve the named columns of `frame` into a table.
    ///
    /// # Arguments
    ///
    /// * `idv` - Subject identifier column; only its first value is kept
    /// * `dv` - Dependent-variable columns, in feature order; all numeric
    /// * `iv` - Independent-variable column; numeric columns are coerced to labels
    ///
    /// # Errors
    ///
    /// `MissingColumn`, `ColumnType`, `DimensionMismatch`, `EmptyTable` or
    /// `NonFiniteValue`, all raised before anything is computed.
    pub fn from_frame(
        frame: &TrialFrame,
        idv: &str,
        dv: &[&str],
        iv: &str,
    ) -> anyhow::Result<Self> {
        if dv.is_empty() {
            return Err(EstimatorError::DependentVariableCount {
                expected: 1,
                got: 0,
            }
            .into());
        }

        let mut dv_columns: Vec<&[f64]> = Vec::with_capacity(dv.len());
        for &name in dv {
            match frame.require(name)? {
                Column::Numeric(values) => dv_columns.push(values),
                Column::Categorical(_) => {
                    return Err(EstimatorError::ColumnType {
                        name: name.to_string(),
                        expected: "numeric",
                    }
                    .into());
                }
            }
        }

        let dv_rows = dv_columns[0].len();
        if let Some(other) = dv_columns.iter().find(|c| c.len() != dv_rows) {
            return Err(EstimatorError::DimensionMismatch {
                dv_rows: other.len(),
                iv_rows: dv_rows,
            }
            .into());
        }

        let labels = frame.require(iv)?.to_labels();
        if labels.len() != dv_rows {
            return Err(EstimatorError::DimensionMismatch {
                dv_rows,
                iv_rows: labels.len(),
            }
            .into());
        }
        if labels.is_empty() {
            return Err(EstimatorError::EmptyTable.into());
        }

        let ids = frame.require(idv)?.to_labels();
        let subject = ids.first().cloned().unwrap_or_default();
        if ids.iter().any(|id| *id != subject) {
            log::warn!(
                "Column '{}' is not constant within the table; using subject '{}'",
                idv,
                subject
            );
        }

        let features = Array2::from_shape_fn((dv_rows, dv_columns.len()), |(i, j)| {
            dv_columns[j][i]
        });
        let dv_names: Vec<String> = dv.iter().map(|name| name.to_string()).collect();
        ensure_finite(&features, &dv_names)?;

        Ok(TrialTable {
            subject,
            dv_names,
            iv_name: iv.to_string(),
            features,
            labels,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn dv_names(&self) -> &[String] {
        &self.dv_names
    }

    pub fn iv_name(&self) -> &str {
        &self.iv_name
    }

    pub fn n_trials(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// One dependent variable across all trials.
    pub fn dv_column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.features.index_axis(Axis(1), j)
    }

    /// Distinct labels, first observed first.
    pub fn levels(&self) -> Vec<String> {
        extract_levels(&self.labels)
    }

    pub fn label_codes(&self, levels: &[String]) -> Vec<usize> {
        encode_labels(&self.labels, levels)
    }

    /// Trial count per level, in `levels()` order.
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let levels = self.levels();
        let counts = count_levels(&self.label_codes(&levels), levels.len());
        levels.into_iter().zip(counts).collect()
    }
}

/// Rejects `NaN` and infinite dependent-variable values.
fn ensure_finite(features: &Array2<f64>, dv_names: &[String]) -> Result<(), EstimatorError> {
    match features.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((trial, j), _)) => Err(EstimatorError::NonFiniteValue {
            name: dv_names[j].clone(),
            trial,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> TrialFrame {
        TrialFrame::new()
            .with_categorical("subject", ["s1"; 4])
            .with_numeric("rt", [410u32, 385, 512, 466])
            .with_numeric("amp", [1.5f32, 2.0, 0.5, 1.0])
            .with_categorical("cond", ["congruent", "incongruent", "incongruent", "congruent"])
    }

    #[test]
    fn resolves_named_columns() {
        let table = TrialTable::from_frame(&frame(), "subject", &["rt", "amp"], "cond").unwrap();
        assert_eq!(table.subject(), "s1");
        assert_eq!(table.n_trials(), 4);
        assert_eq!(table.n_features(), 2);
        assert_eq!(table.features()[[2, 0]], 512.0);
        assert_eq!(table.dv_column(1).to_vec(), vec![1.5, 2.0, 0.5, 1.0]);
        assert_eq!(
            table.label_counts(),
            vec![("congruent".to_string(), 2), ("incongruent".to_string(), 2)]
        );
    }

    #[test]
    fn numeric_iv_is_coerced_to_labels() {
        let frame = frame().with_numeric("block", [1, 2, 2, 1]);
        let table = TrialTable::from_frame(&frame, "subject", &["rt"], "block").unwrap();
        assert_eq!(table.levels(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn missing_and_mistyped_columns_are_rejected() {
        let err = TrialTable::from_frame(&frame(), "subject", &["nope"], "cond").unwrap_err();
        assert_eq!(
            err.downcast_ref::<EstimatorError>(),
            Some(&EstimatorError::MissingColumn("nope".to_string()))
        );

        let err = TrialTable::from_frame(&frame(), "subject", &["cond"], "cond").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::ColumnType { .. })
        ));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let frame = frame().with_categorical("cond", ["congruent", "incongruent", "congruent"]);
        let err = TrialTable::from_frame(&frame, "subject", &["rt"], "cond").unwrap_err();
        assert_eq!(
            err.downcast_ref::<EstimatorError>(),
            Some(&EstimatorError::DimensionMismatch {
                dv_rows: 4,
                iv_rows: 3
            })
        );

        let features = Array2::zeros((5, 1));
        let labels = vec!["a".to_string(); 4];
        let err = TrialTable::new("s", features, labels).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::DimensionMismatch { dv_rows: 5, iv_rows: 4 })
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let frame = frame().with_numeric("amp", [1.5, f64::NAN, 0.5, 1.0]);
        let err = TrialTable::from_frame(&frame, "subject", &["rt", "amp"], "cond").unwrap_err();
        assert_eq!(
            err.downcast_ref::<EstimatorError>(),
            Some(&EstimatorError::NonFiniteValue {
                name: "amp".to_string(),
                trial: 1
            })
        );

        let features = Array2::from_shape_vec((2, 1), vec![0.0, f64::INFINITY]).unwrap();
        let labels = vec!["a".to_string(), "b".to_string()];
        let err = TrialTable::new("s", features, labels).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::NonFiniteValue { trial: 1, .. })
        ));
    }
}
