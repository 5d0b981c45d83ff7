// Database construction and load-boundary validation.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::{HashMap, HashSet};
use sarf_core::{Feature, FeatureSet};
use tracing::info;

use crate::DbError;
use crate::category::{CategoryId, CategoryTable};
use crate::database::{FeatureDomain, MorphologyDatabase};
use crate::record::{AffixRecord, Morpheme, StemRecord};
use crate::rewrite::RewriteRule;

/// Collects rows and relations, then validates and freezes them into a
/// [`MorphologyDatabase`].
///
/// Methods return `&mut Self` so rows can be chained. Nothing is checked
/// until [`build`](Self::build); all feature names and values are validated
/// there, once, so the generator can trust the tables it reads.
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    categories: CategoryTable,
    defines: BTreeMap<Feature, FeatureDomain>,
    defaults: Vec<FeatureSet>,
    tokenizations: Vec<Feature>,
    rewrites: Vec<(String, String, String)>,
    stems: Vec<StemRecord>,
    prefixes: Vec<AffixRecord>,
    suffixes: Vec<AffixRecord>,
    stem_prefix: Vec<(CategoryId, CategoryId)>,
    stem_suffix: Vec<(CategoryId, CategoryId)>,
    prefix_suffix: Vec<(CategoryId, CategoryId)>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a feature and its legal values. Redefinition replaces.
    pub fn define(&mut self, feature: Feature, domain: FeatureDomain) -> &mut Self {
        self.defines.insert(feature, domain);
        self
    }

    /// Add the default feature row for the POS named by its `pos` value.
    pub fn default_features(&mut self, defaults: FeatureSet) -> &mut Self {
        self.defaults.push(defaults);
        self
    }

    pub fn tokenization(&mut self, feature: Feature) -> &mut Self {
        if !self.tokenizations.contains(&feature) {
            self.tokenizations.push(feature);
        }
        self
    }

    /// Append a rewrite rule to a dialect variant's table.
    pub fn rewrite(
        &mut self,
        variant: &str,
        pattern: &str,
        replacement: &str,
    ) -> &mut Self {
        self.rewrites.push((
            variant.to_string(),
            pattern.to_string(),
            replacement.to_string(),
        ));
        self
    }

    pub fn add_prefix(&mut self, category: &str, morpheme: Morpheme) -> &mut Self {
        let category = self.categories.intern(category);
        self.prefixes.push(AffixRecord::new(category, morpheme));
        self
    }

    pub fn add_suffix(&mut self, category: &str, morpheme: Morpheme) -> &mut Self {
        let category = self.categories.intern(category);
        self.suffixes.push(AffixRecord::new(category, morpheme));
        self
    }

    /// Add a stem. It is indexed under `lex` with any `_<n>` sense index
    /// stripped.
    pub fn add_stem(&mut self, lex: &str, category: &str, morpheme: Morpheme) -> &mut Self {
        let category = self.categories.intern(category);
        self.stems.push(StemRecord::new(category, lex, morpheme));
        self
    }

    /// License a prefix category for a stem category.
    pub fn stem_prefix(&mut self, stem_category: &str, prefix_category: &str) -> &mut Self {
        let pair = (
            self.categories.intern(stem_category),
            self.categories.intern(prefix_category),
        );
        self.stem_prefix.push(pair);
        self
    }

    /// License a suffix category for a stem category.
    pub fn stem_suffix(&mut self, stem_category: &str, suffix_category: &str) -> &mut Self {
        let pair = (
            self.categories.intern(stem_category),
            self.categories.intern(suffix_category),
        );
        self.stem_suffix.push(pair);
        self
    }

    /// License a suffix category to follow a prefix category.
    pub fn prefix_suffix(&mut self, prefix_category: &str, suffix_category: &str) -> &mut Self {
        let pair = (
            self.categories.intern(prefix_category),
            self.categories.intern(suffix_category),
        );
        self.prefix_suffix.push(pair);
        self
    }

    /// Validate every row and build the immutable database.
    pub fn build(self) -> Result<MorphologyDatabase, DbError> {
        match self.defines.get(&Feature::Pos) {
            Some(FeatureDomain::Closed(_)) => {}
            _ => return Err(DbError::PosNotClosed),
        }

        for &feature in &self.tokenizations {
            if !self.defines.contains_key(&feature) {
                return Err(DbError::UndefinedFeature {
                    feature,
                    context: "tokenization".to_string(),
                });
            }
        }

        let mut defaults = HashMap::with_capacity(self.defaults.len());
        for row in self.defaults {
            check_features(&self.defines, &row, "defaults")?;
            let Some(pos) = row.get(Feature::Pos) else {
                return Err(DbError::DefaultWithoutPos);
            };
            if defaults.contains_key(pos) {
                return Err(DbError::DuplicateDefault {
                    pos: pos.to_string(),
                });
            }
            defaults.insert(pos.to_string(), row);
        }

        let mut rewrites: HashMap<String, Vec<RewriteRule>> = HashMap::new();
        for (variant, pattern, replacement) in self.rewrites {
            let rule = RewriteRule::new(&pattern, replacement).map_err(|source| {
                DbError::Rewrite {
                    variant: variant.clone(),
                    source,
                }
            })?;
            rewrites.entry(variant).or_default().push(rule);
        }

        let mut lemmas: HashMap<String, Vec<StemRecord>> = HashMap::new();
        for stem in self.stems {
            check_features(&self.defines, &stem.features, &stem.lex)?;
            if stem.pos().is_none() {
                return Err(DbError::StemWithoutPos { lex: stem.lex });
            }
            lemmas.entry(stem.lemma().to_string()).or_default().push(stem);
        }

        let prefixes = index_affixes(&self.defines, &self.categories, self.prefixes)?;
        let suffixes = index_affixes(&self.defines, &self.categories, self.suffixes)?;

        let mut prefix_suffix: HashMap<CategoryId, HashSet<CategoryId>> = HashMap::new();
        for (prefix, suffix) in self.prefix_suffix {
            prefix_suffix.entry(prefix).or_default().insert(suffix);
        }

        let db = MorphologyDatabase {
            categories: self.categories,
            defines: self.defines,
            defaults,
            tokenizations: self.tokenizations.into_iter().collect::<BTreeSet<_>>(),
            rewrites,
            lemmas,
            prefixes,
            suffixes,
            stem_prefix: ordered_relation(self.stem_prefix),
            stem_suffix: ordered_relation(self.stem_suffix),
            prefix_suffix,
        };

        info!(
            lemmas = db.lemma_count(),
            stems = db.stem_count(),
            prefixes = db.prefix_count(),
            suffixes = db.suffix_count(),
            categories = db.categories.len(),
            "morphology database built"
        );

        Ok(db)
    }
}

/// Check that every feature of a row is defined and has a legal value.
fn check_features(
    defines: &BTreeMap<Feature, FeatureDomain>,
    features: &FeatureSet,
    context: &str,
) -> Result<(), DbError> {
    for (feature, value) in features.iter() {
        let Some(domain) = defines.get(&feature) else {
            return Err(DbError::UndefinedFeature {
                feature,
                context: context.to_string(),
            });
        };
        if !domain.allows(value) {
            return Err(DbError::InvalidValue {
                feature,
                value: value.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}

fn index_affixes(
    defines: &BTreeMap<Feature, FeatureDomain>,
    categories: &CategoryTable,
    records: Vec<AffixRecord>,
) -> Result<HashMap<CategoryId, Vec<AffixRecord>>, DbError> {
    let mut index: HashMap<CategoryId, Vec<AffixRecord>> = HashMap::new();
    for record in records {
        check_features(defines, &record.features, categories.name(record.category))?;
        index.entry(record.category).or_default().push(record);
    }
    Ok(index)
}

/// Group pairs by their first element, keeping first-seen order of the
/// second element and dropping repeats.
fn ordered_relation(pairs: Vec<(CategoryId, CategoryId)>) -> HashMap<CategoryId, Vec<CategoryId>> {
    let mut relation: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for (from, to) in pairs {
        let targets = relation.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }
    relation
}
