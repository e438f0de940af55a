//! Input data model and schema binding.
//!
//! - [`types`] - [`EntityId`], [`Interaction`] and the validated [`InteractionSet`]
//! - [`schema`] - [`ColumnMap`] and [`bind_records`] for loosely-typed rows

pub mod schema;
pub mod types;

pub use schema::{bind_records, has_column, ColumnMap, FieldValue, RawRecord};
pub use types::{EntityId, Interaction, InteractionSet, Timestamp};
