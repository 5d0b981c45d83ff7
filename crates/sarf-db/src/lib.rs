//! Morphology rule database for the sarf generator.
//!
//! The database holds the stem index, the prefix and suffix tables, the
//! three category compatibility relations, feature domains, per-POS
//! defaults and dialect rewrite tables. It is built once and only read
//! afterwards.
//!
//! # Architecture
//!
//! - [`category`] -- interned category ids
//! - [`record`] -- stem and affix rows
//! - [`rewrite`] -- dialect rewrite rules
//! - [`database`] -- the immutable [`MorphologyDatabase`] and its accessors
//! - [`builder`] -- [`DatabaseBuilder`] and load-boundary validation
//! - [`format`] -- the sectioned text format loader

pub mod builder;
pub mod category;
pub mod database;
pub mod format;
pub mod record;
pub mod rewrite;

pub use builder::DatabaseBuilder;
pub use category::CategoryId;
pub use database::{FeatureDomain, MorphologyDatabase};
pub use record::{AffixRecord, Morpheme, StemRecord, strip_lex};
pub use rewrite::RewriteRule;

use sarf_core::Feature;

/// Error type for database building and loading.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("pos must be defined with a closed set of values")]
    PosNotClosed,
    #[error("feature {feature} is not defined (in {context})")]
    UndefinedFeature { feature: Feature, context: String },
    #[error("invalid value {value:?} for feature {feature} (in {context})")]
    InvalidValue {
        feature: Feature,
        value: String,
        context: String,
    },
    #[error("default feature row without pos")]
    DefaultWithoutPos,
    #[error("duplicate default row for pos {pos:?}")]
    DuplicateDefault { pos: String },
    #[error("stem {lex:?} has no pos")]
    StemWithoutPos { lex: String },
    #[error("invalid rewrite pattern for variant {variant}: {source}")]
    Rewrite {
        variant: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to read database: {0}")]
    Io(#[from] std::io::Error),
}
