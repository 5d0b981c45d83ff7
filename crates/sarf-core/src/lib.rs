//! Shared types for the sarf morphological generator.
//!
//! - [`feature`] -- the closed [`Feature`] vocabulary and [`FeatureSet`] bundles
//! - [`analysis`] -- the generated [`Analysis`] record
//! - [`trace`] -- [`TraceCode`]s and the per-call [`DebugTrace`]

pub mod analysis;
pub mod feature;
pub mod trace;

pub use analysis::Analysis;
pub use feature::{Feature, FeatureError, FeatureSet, NO_CLITIC};
pub use trace::{DebugTrace, TraceCode, TraceEntry};
