// Immutable morphology database and its read-only accessors.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::{HashMap, HashSet};
use sarf_core::{Feature, FeatureSet};

use crate::category::{CategoryId, CategoryTable};
use crate::record::{AffixRecord, StemRecord};
use crate::rewrite::RewriteRule;

/// The legal values of one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureDomain {
    /// Any value is accepted.
    Open,
    /// Only the listed values are accepted.
    Closed(BTreeSet<String>),
}

impl FeatureDomain {
    pub fn closed<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureDomain::Closed(values.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, value: &str) -> bool {
        match self {
            FeatureDomain::Open => true,
            FeatureDomain::Closed(values) => values.contains(value),
        }
    }

    /// The legal values, or `None` for an open domain.
    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            FeatureDomain::Open => None,
            FeatureDomain::Closed(values) => Some(values),
        }
    }
}

/// Rule database consumed by the generator.
///
/// Built once by [`DatabaseBuilder`](crate::DatabaseBuilder) or the text
/// loader and never mutated afterwards. Every table is reachable only
/// through the accessors below, and the whole structure is `Send + Sync`,
/// so one instance can serve any number of threads.
#[derive(Debug)]
pub struct MorphologyDatabase {
    pub(crate) categories: CategoryTable,
    pub(crate) defines: BTreeMap<Feature, FeatureDomain>,
    pub(crate) defaults: HashMap<String, FeatureSet>,
    pub(crate) tokenizations: BTreeSet<Feature>,
    pub(crate) rewrites: HashMap<String, Vec<RewriteRule>>,
    pub(crate) lemmas: HashMap<String, Vec<StemRecord>>,
    pub(crate) prefixes: HashMap<CategoryId, Vec<AffixRecord>>,
    pub(crate) suffixes: HashMap<CategoryId, Vec<AffixRecord>>,
    pub(crate) stem_prefix: HashMap<CategoryId, Vec<CategoryId>>,
    pub(crate) stem_suffix: HashMap<CategoryId, Vec<CategoryId>>,
    pub(crate) prefix_suffix: HashMap<CategoryId, HashSet<CategoryId>>,
}

impl MorphologyDatabase {
    /// Stem records for a lemma, in load order.
    pub fn stems(&self, lemma: &str) -> Option<&[StemRecord]> {
        self.lemmas.get(lemma).map(Vec::as_slice)
    }

    /// Prefix records of a category. `None` when the category has no records.
    pub fn prefixes(&self, category: CategoryId) -> Option<&[AffixRecord]> {
        self.prefixes.get(&category).map(Vec::as_slice)
    }

    /// Suffix records of a category. `None` when the category has no records.
    pub fn suffixes(&self, category: CategoryId) -> Option<&[AffixRecord]> {
        self.suffixes.get(&category).map(Vec::as_slice)
    }

    /// Prefix categories licensed for a stem category, in load order.
    pub fn prefix_categories(&self, stem_category: CategoryId) -> &[CategoryId] {
        self.stem_prefix
            .get(&stem_category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Suffix categories licensed for a stem category, in load order.
    pub fn suffix_categories(&self, stem_category: CategoryId) -> &[CategoryId] {
        self.stem_suffix
            .get(&stem_category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a prefix category and a suffix category may co-occur.
    pub fn prefix_suffix_compatible(&self, prefix: CategoryId, suffix: CategoryId) -> bool {
        self.prefix_suffix
            .get(&prefix)
            .is_some_and(|suffixes| suffixes.contains(&suffix))
    }

    /// Domain of a feature, or `None` if the database does not define it.
    pub fn domain(&self, feature: Feature) -> Option<&FeatureDomain> {
        self.defines.get(&feature)
    }

    /// Default feature values for a POS.
    pub fn defaults(&self, pos: &str) -> Option<&FeatureSet> {
        self.defaults.get(pos)
    }

    /// Whether `pos` is a legal POS value with a defaults row.
    pub fn is_legal_pos(&self, pos: &str) -> bool {
        self.domain(Feature::Pos).is_some_and(|d| d.allows(pos)) && self.defaults.contains_key(pos)
    }

    /// Rewrite rules of a dialect variant, in application order.
    pub fn rewrite_rules(&self, variant: &str) -> Option<&[RewriteRule]> {
        self.rewrites.get(variant).map(Vec::as_slice)
    }

    /// Names of the variants that have rewrite tables, sorted.
    pub fn variants(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rewrites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every feature the database defines.
    pub fn all_features(&self) -> BTreeSet<Feature> {
        self.defines.keys().copied().collect()
    }

    /// Features declared relevant to tokenization.
    pub fn tokenization_features(&self) -> BTreeSet<Feature> {
        self.tokenizations.clone()
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        self.categories.name(id)
    }

    pub fn category(&self, name: &str) -> Option<CategoryId> {
        self.categories.get(name)
    }

    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    pub fn stem_count(&self) -> usize {
        self.lemmas.values().map(Vec::len).sum()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.values().map(Vec::len).sum()
    }

    pub fn suffix_count(&self) -> usize {
        self.suffixes.values().map(Vec::len).sum()
    }
}
