use thiserror::Error;

/// Failure kinds raised while building a trial table or computing a statistic.
///
/// Public functions return `anyhow::Result`; match on a kind with
/// `err.downcast_ref::<EstimatorError>()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("dimension mismatch: {dv_rows} dependent-variable rows but {iv_rows} independent-variable rows")]
    DimensionMismatch { dv_rows: usize, iv_rows: usize },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{name}' must be {expected}")]
    ColumnType { name: String, expected: &'static str },

    #[error("column '{name}' holds a non-finite value at trial {trial}")]
    NonFiniteValue { name: String, trial: usize },

    #[error("trial table is empty")]
    EmptyTable,

    #[error("expected {expected} dependent-variable column(s), got {got}")]
    DependentVariableCount { expected: usize, got: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("at least two labels are required, found {0}")]
    TooFewLabels(usize),

    #[error("label '{label}' has {count} trial(s), at least {required} are required")]
    TooFewTrialsPerLabel {
        label: String,
        count: usize,
        required: usize,
    },

    #[error("fold count {fold_count} exceeds the {class_size} trial(s) of label '{label}'")]
    FoldCountExceedsClassSize {
        fold_count: usize,
        label: String,
        class_size: usize,
    },

    #[error("fold {fold} is degenerate: {reason}")]
    DegenerateFold { fold: usize, reason: String },
}

impl EstimatorError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        EstimatorError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
