// Generated analysis result type

use serde::{Deserialize, Serialize};

use crate::feature::{Feature, FeatureSet};

/// One generated word form together with its resolved features.
///
/// Produced by merging a prefix, a stem and a suffix record. `diac` is the
/// surface (diacritized) form after dialect rewriting; `stem` is the stem
/// fragment alone. `bw` and `gloss` hold the `+`-joined parts contributed by
/// the three records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Analysis {
    pub diac: String,
    pub lex: String,
    pub stem: String,
    pub stem_category: String,
    pub bw: String,
    pub gloss: String,
    pub features: FeatureSet,
}

impl Analysis {
    /// Create an analysis holding only a surface form.
    pub fn new(diac: impl Into<String>) -> Self {
        Self {
            diac: diac.into(),
            ..Self::default()
        }
    }

    /// Look up a resolved feature value.
    pub fn get(&self, feature: Feature) -> Option<&str> {
        self.features.get(feature)
    }

    /// Whether every feature in `request` has the same value here.
    ///
    /// A requested feature missing from the analysis counts as a mismatch.
    pub fn agrees_with(&self, request: &FeatureSet) -> bool {
        request
            .iter()
            .all(|(feature, value)| self.features.get(feature) == Some(value))
    }
}
