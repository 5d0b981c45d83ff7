// Stem and affix records stored in the database.

use sarf_core::{Feature, FeatureSet};

use crate::category::CategoryId;

/// Builder input for one morpheme row, before its category is interned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Morpheme {
    pub diac: String,
    pub bw: String,
    pub gloss: String,
    pub features: FeatureSet,
}

impl Morpheme {
    pub fn new(diac: impl Into<String>) -> Self {
        Self {
            diac: diac.into(),
            ..Self::default()
        }
    }

    pub fn with(mut self, feature: Feature, value: impl Into<String>) -> Self {
        self.features.insert(feature, value);
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    pub fn with_bw(mut self, bw: impl Into<String>) -> Self {
        self.bw = bw.into();
        self
    }

    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.gloss = gloss.into();
        self
    }
}

/// A lemma-indexed stem row.
///
/// `features` holds everything the stem fixes: at least `pos`, usually `vox`
/// and `rat`, the clitic slot defaults (`"0"` for no clitic) and any other
/// grammatical values tied to this stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemRecord {
    pub category: CategoryId,
    pub lex: String,
    pub diac: String,
    pub bw: String,
    pub gloss: String,
    pub features: FeatureSet,
}

impl StemRecord {
    pub(crate) fn new(category: CategoryId, lex: &str, morpheme: Morpheme) -> Self {
        Self {
            category,
            lex: lex.to_string(),
            diac: morpheme.diac,
            bw: morpheme.bw,
            gloss: morpheme.gloss,
            features: morpheme.features,
        }
    }

    pub fn get(&self, feature: Feature) -> Option<&str> {
        self.features.get(feature)
    }

    pub fn pos(&self) -> Option<&str> {
        self.get(Feature::Pos)
    }

    /// The lemma this stem is indexed under.
    pub fn lemma(&self) -> &str {
        strip_lex(&self.lex)
    }
}

/// A prefix or suffix row: the features it fixes and its surface fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixRecord {
    pub category: CategoryId,
    pub diac: String,
    pub bw: String,
    pub gloss: String,
    pub features: FeatureSet,
}

impl AffixRecord {
    pub(crate) fn new(category: CategoryId, morpheme: Morpheme) -> Self {
        Self {
            category,
            diac: morpheme.diac,
            bw: morpheme.bw,
            gloss: morpheme.gloss,
            features: morpheme.features,
        }
    }

    pub fn get(&self, feature: Feature) -> Option<&str> {
        self.features.get(feature)
    }
}

/// Strip a trailing `_<digits>` sense index from a lexical identifier.
///
/// `katab_1` becomes `katab`; identifiers without such a suffix are
/// returned unchanged.
pub fn strip_lex(lex: &str) -> &str {
    match lex.rsplit_once('_') {
        Some((base, index))
            if !base.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => lex,
    }
}
