//! # Recometrics Core
//!
//! Offline quality metrics for recommender systems.
//!
//! Compares ground-truth user–item interactions with model predictions and
//! reports rating-error metrics (RMSE, MAE, R², explained variance) and
//! top-k ranking metrics (precision, recall, NDCG, MAP, MRR). Every entry
//! point is a pure function; the same code runs single-threaded or on a
//! rayon pool.
//!
//! ## Modules
//!
//! - [`data`] - Interaction records and schema binding
//! - [`evaluation`] - Joiner, relevancy extraction, metric aggregators
//! - [`config`] - Default column names, metric parameters, [`config::EvalConfig`]
//! - [`error`] - [`error::EvaluationError`] taxonomy

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;

pub use config::{EvalConfig, RelevancyMethod};
pub use data::{bind_records, ColumnMap, EntityId, Interaction, InteractionSet};
pub use error::{EvaluationError, Result};
pub use evaluation::MetricResult;
