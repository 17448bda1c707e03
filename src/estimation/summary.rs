use statrs::statistics::{Data, Median, Statistics};
use std::fmt;
use std::sync::Arc;

/// Reduction applied to one condition's dependent-variable values within a half.
#[derive(Clone)]
pub enum Summary {
    Mean,
    Median,
    /// Any reduction; returning `NaN` marks the value as undefined.
    Custom(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl Summary {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Summary::Custom(Arc::new(f))
    }

    /// Summarize `values`; `None` when the input is empty or the result is `NaN`.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let value = match self {
            Summary::Mean => values.iter().mean(),
            Summary::Median => Data::new(values.to_vec()).median(),
            Summary::Custom(f) => f(values),
        };
        (!value.is_nan()).then_some(value)
    }
}

impl fmt::Debug for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Mean => write!(f, "Mean"),
            Summary::Median => write!(f, "Median"),
            Summary::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
