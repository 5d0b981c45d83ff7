//! Morphological generation over a templatic morphology database.
//!
//! Given a lemma and a partial feature set, [`Generator`] enumerates every
//! prefix + stem + suffix combination the database licenses, merges each
//! triple into an [`Analysis`](sarf_core::Analysis) and keeps those that
//! agree with the request.
//!
//! # Architecture
//!
//! - [`generator`] -- request validation, clitic defaulting, the triangle
//!   compatibility search and debug tracing
//! - [`merge`] -- [`FeatureMerger`]: surface concatenation, dialect rewrite
//!   and feature precedence
//!
//! # Example
//!
//! ```
//! use sarf_core::FeatureSet;
//! use sarf_db::MorphologyDatabase;
//! use sarf_gen::Generator;
//!
//! let db = MorphologyDatabase::parse(
//!     "###DEFINES###\n\
//!      DEFINE pos pos:verb\n\
//!      DEFINE asp asp:p\n\
//!      ####DEFAULTS###\n\
//!      DEFAULT pos:verb asp:p\n\
//!      ####PREFIXES###\n\
//!      \tP0\t\n\
//!      ####SUFFIXES###\n\
//!      a\tS0\t\n\
//!      ####STEMS###\n\
//!      katab\tPV\tlex:katab_1 pos:verb\n\
//!      ####TABLE AB###\n\
//!      P0 PV\n\
//!      ####TABLE BC###\n\
//!      PV S0\n\
//!      ####TABLE AC###\n\
//!      P0 S0\n",
//! )
//! .unwrap();
//!
//! let generator = Generator::new(&db).unwrap();
//! let request = FeatureSet::parse("pos:verb").unwrap();
//! let analyses = generator.generate("katab", &request).unwrap();
//! assert_eq!(analyses[0].diac, "kataba");
//! ```

pub mod generator;
pub mod merge;

pub use generator::{
    DEFAULT_VARIANT, DebugGeneration, GenerateError, GeneratedMatch, Generator, GeneratorError,
    GeneratorOptions,
};
pub use merge::{FeatureMerger, MergeMode};
