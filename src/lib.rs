//! # weak-null-statistics
//!
//! Per-subject test statistics for permutation tests of weak null hypotheses in
//! repeated-measures experiments: hypotheses that no individual shows a reliable
//! effect, which can be rejected even when individual effects point in opposite
//! directions and cancel in the group mean.
//!
//! ## Core Features
//!
//! - **Sign consistency**: how often the direction of a subject's condition
//!   difference replicates across random half-splits of their trials
//! - **Classification accuracy**: cross-validated accuracy of a linear SVM that
//!   predicts the condition from the dependent variables, with optional class
//!   imbalance weighting
//! - **Reproducibility**: every call takes its own random stream; seeds for
//!   parallel (subject, permutation) calls come from [`seed::derive_seed`]
//!
//! ## Quick Start
//!
//! Build a [`data::TrialTable`] for one subject, pick an estimator by building
//! its parameter bundle, and call [`estimation::SubjectEstimator::estimate`]
//! once per permutation. Looping over subjects and permutations, and turning
//! the collected statistics into a p-value, is left to the caller.
//!
//! ## Module Organization
//!
//! - **[`data`]**: Named trial columns and the typed per-subject table
//! - **[`estimation`]**: The two estimators, their parameters and results
//! - **[`seed`]**: Seed derivation for independent random streams
//! - **[`error`]**: Error kinds raised by table construction and estimators

pub mod data;
pub mod error;
pub mod estimation;
pub mod seed;

pub use error::EstimatorError;
