//! Franchise KPI dashboard core.
//!
//! Load a KPI file once with [`loader::load`], derive dropdown choices with
//! [`layout::control_options`], then call [`engine::compute`] for every
//! selection to get the seven derived views.
pub mod charts;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod layout;
pub mod loader;
pub mod output;
pub mod types;
pub mod util;

pub use dataset::Dataset;
pub use engine::compute;
pub use error::LoadError;
pub use layout::control_options;
pub use loader::load;
pub use types::{ControlOptions, DerivedViews, KpiRecord, Selection};
