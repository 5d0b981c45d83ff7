// Generator: lemma + requested features -> every licensed surface form.
//
// The search walks stems of the lemma, then the prefix categories licensed
// for each stem category, their records, the licensed suffix categories and
// their records. Each level prunes on its own constraints; the prefix/suffix
// pair must also be licensed by the prefix-suffix relation (the third side
// of the compatibility triangle). Surviving triples are merged and the
// merged analysis must agree with the original request.
//
// Pruning never fails the call. An absent lemma is a soft outcome (L0)
// checked first; hard errors are limited to malformed requests for a known
// lemma and are reported before any stem is visited.

use std::collections::BTreeSet;

use sarf_core::{Analysis, DebugTrace, Feature, FeatureError, FeatureSet, NO_CLITIC, TraceCode};
use sarf_db::{AffixRecord, MorphologyDatabase, StemRecord};
use tracing::{debug, trace};

use crate::merge::{FeatureMerger, MergeMode};

/// Variant used when none is configured. It needs no rewrite table.
pub const DEFAULT_VARIANT: &str = "msa";

/// Error type for generator construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// The variant is neither the default nor backed by a rewrite table.
    #[error("unknown dialect variant: {0}")]
    UnknownVariant(String),
}

/// Error type for malformed generation requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The feature is not defined by the bound database.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// The value is outside the feature's domain, or `pos` is missing.
    #[error("invalid value for feature {feature}: {}", .value.as_deref().unwrap_or("<missing>"))]
    InvalidFeatureValue {
        feature: Feature,
        value: Option<String>,
    },

    /// A textual request token was not of the form `name:value`.
    #[error("malformed request token: {0}")]
    MalformedRequest(String),
}

impl From<FeatureError> for GenerateError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::UnknownFeature(name) => GenerateError::UnknownFeature(name),
            FeatureError::MalformedToken(token) => GenerateError::MalformedRequest(token),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Dialect variant selecting the surface rewrite table.
    pub variant: String,
    /// Only compute surface forms and record-carried features.
    pub diac_only: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            variant: DEFAULT_VARIANT.to_string(),
            diac_only: false,
        }
    }
}

/// One accepted combination with the records that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedMatch<'db> {
    pub analysis: Analysis,
    pub prefix_category: &'db str,
    pub stem_category: &'db str,
    pub suffix_category: &'db str,
    pub prefix: &'db AffixRecord,
    pub stem: &'db StemRecord,
    pub suffix: &'db AffixRecord,
}

/// Result of a debug-mode generation call.
#[derive(Debug, Clone)]
pub struct DebugGeneration<'db> {
    pub matches: Vec<GeneratedMatch<'db>>,
    pub trace: DebugTrace,
}

impl DebugGeneration<'_> {
    pub fn analyses(&self) -> impl Iterator<Item = &Analysis> + '_ {
        self.matches.iter().map(|m| &m.analysis)
    }

    pub fn into_analyses(self) -> Vec<Analysis> {
        self.matches.into_iter().map(|m| m.analysis).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Collects trace entries when debugging; otherwise only logs.
struct Recorder {
    trace: Option<DebugTrace>,
}

impl Recorder {
    fn new(enabled: bool) -> Self {
        Self {
            trace: enabled.then(DebugTrace::new),
        }
    }

    fn note(&mut self, code: TraceCode) {
        trace!(code = code.code(), "candidate pruned");
        if let Some(t) = self.trace.as_mut() {
            t.push(code);
        }
    }

    fn note_detail(&mut self, code: TraceCode, detail: &str) {
        trace!(code = code.code(), detail, "candidate pruned");
        if let Some(t) = self.trace.as_mut() {
            t.push_detail(code, detail);
        }
    }

    fn finish(self) -> DebugTrace {
        self.trace.unwrap_or_default()
    }
}

/// Morphological generator bound to one database.
///
/// Holds only shared references, so it is cheap to create, `Send + Sync`,
/// and any number of calls may run in parallel against the same database.
#[derive(Debug, Clone)]
pub struct Generator<'db> {
    db: &'db MorphologyDatabase,
    merger: FeatureMerger<'db>,
    options: GeneratorOptions,
}

impl<'db> Generator<'db> {
    /// Create a generator with default options.
    pub fn new(db: &'db MorphologyDatabase) -> Result<Self, GeneratorError> {
        Self::with_options(db, GeneratorOptions::default())
    }

    pub fn with_options(
        db: &'db MorphologyDatabase,
        options: GeneratorOptions,
    ) -> Result<Self, GeneratorError> {
        if options.variant != DEFAULT_VARIANT && db.rewrite_rules(&options.variant).is_none() {
            return Err(GeneratorError::UnknownVariant(options.variant));
        }
        let mode = if options.diac_only {
            MergeMode::DiacOnly
        } else {
            MergeMode::Full
        };
        Ok(Self {
            db,
            merger: FeatureMerger::new(db, &options.variant, mode),
            options,
        })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn database(&self) -> &'db MorphologyDatabase {
        self.db
    }

    /// Generate every analysis of `lemma` that agrees with `features`.
    ///
    /// `features` must contain a legal `pos`. Other features may be left
    /// unspecified. Results come in search order and are not deduplicated.
    pub fn generate(&self, lemma: &str, features: &FeatureSet) -> Result<Vec<Analysis>, GenerateError> {
        let mut recorder = Recorder::new(false);
        let matches = self.search(lemma, features, &mut recorder)?;
        Ok(matches.into_iter().map(|m| m.analysis).collect())
    }

    /// Like [`generate`](Self::generate), but also returns the contributing
    /// records of each result and the trace of every pruning decision.
    pub fn generate_debug(
        &self,
        lemma: &str,
        features: &FeatureSet,
    ) -> Result<DebugGeneration<'db>, GenerateError> {
        let mut recorder = Recorder::new(true);
        let matches = self.search(lemma, features, &mut recorder)?;
        if !matches.is_empty() {
            recorder.note(TraceCode::Ok);
        }
        Ok(DebugGeneration {
            matches,
            trace: recorder.finish(),
        })
    }

    /// Every feature the bound database defines.
    pub fn all_features(&self) -> BTreeSet<Feature> {
        self.db.all_features()
    }

    /// Features the bound database marks as relevant to tokenization.
    pub fn tokenization_features(&self) -> BTreeSet<Feature> {
        self.db.tokenization_features()
    }

    /// Check the request against the database and return the POS defaults.
    fn validate(&self, request: &FeatureSet) -> Result<&'db FeatureSet, GenerateError> {
        for (feature, value) in request.iter() {
            let Some(domain) = self.db.domain(feature) else {
                return Err(GenerateError::UnknownFeature(feature.as_str().to_string()));
            };
            if !domain.allows(value) {
                return Err(GenerateError::InvalidFeatureValue {
                    feature,
                    value: Some(value.to_string()),
                });
            }
        }

        let pos = request.get(Feature::Pos);
        pos.filter(|p| self.db.is_legal_pos(p))
            .and_then(|p| self.db.defaults(p))
            .ok_or_else(|| GenerateError::InvalidFeatureValue {
                feature: Feature::Pos,
                value: pos.map(str::to_string),
            })
    }

    fn search(
        &self,
        lemma: &str,
        request: &FeatureSet,
        recorder: &mut Recorder,
    ) -> Result<Vec<GeneratedMatch<'db>>, GenerateError> {
        let mut matches = Vec::new();

        let Some(stems) = self.db.stems(lemma) else {
            recorder.note_detail(TraceCode::LemmaNotFound, lemma);
            debug!(lemma, "lemma not found");
            return Ok(matches);
        };

        let defaults = self.validate(request)?;

        if !request.keys_subset_of(defaults) {
            recorder.note(TraceCode::NotDefaultSubset);
            debug!(lemma, request = %request, "request exceeds POS default features");
            return Ok(matches);
        }

        let expanded = expand_clitics(request, defaults);

        for stem in stems {
            if let Some((code, feature)) = stem_conflict(stem, &expanded) {
                recorder.note_detail(code, feature.as_str());
                continue;
            }

            let prefix_categories = self.db.prefix_categories(stem.category);
            let suffix_categories = self.db.suffix_categories(stem.category);

            for &prefix_category in prefix_categories {
                let Some(prefixes) = self.db.prefixes(prefix_category) else {
                    recorder.note_detail(
                        TraceCode::NoPrefixRecords,
                        self.db.category_name(prefix_category),
                    );
                    continue;
                };

                for prefix in prefixes {
                    if let Some(feature) =
                        affix_clitic_conflict(&Feature::PROCLITICS, &expanded, prefix, stem)
                    {
                        recorder.note_detail(TraceCode::ProcliticMismatch, feature.as_str());
                        continue;
                    }

                    for &suffix_category in suffix_categories {
                        let Some(suffixes) = self.db.suffixes(suffix_category) else {
                            recorder.note_detail(
                                TraceCode::NoSuffixRecords,
                                self.db.category_name(suffix_category),
                            );
                            continue;
                        };

                        if !self
                            .db
                            .prefix_suffix_compatible(prefix_category, suffix_category)
                        {
                            recorder.note(TraceCode::PrefixSuffixIncompatible);
                            continue;
                        }

                        for suffix in suffixes {
                            if let Some(feature) =
                                affix_clitic_conflict(&Feature::ENCLITICS, &expanded, suffix, stem)
                            {
                                recorder.note_detail(TraceCode::EncliticMismatch, feature.as_str());
                                continue;
                            }

                            let analysis = self.merger.merge(prefix, stem, suffix);
                            if let Some(feature) = Self::disagreement(&analysis, request) {
                                recorder.note_detail(TraceCode::MergedMismatch, feature.as_str());
                                continue;
                            }

                            matches.push(GeneratedMatch {
                                analysis,
                                prefix_category: self.db.category_name(prefix_category),
                                stem_category: self.db.category_name(stem.category),
                                suffix_category: self.db.category_name(suffix_category),
                                prefix,
                                stem,
                                suffix,
                            });
                        }
                    }
                }
            }
        }

        debug!(lemma, request = %request, results = matches.len(), "generation finished");
        Ok(matches)
    }

    /// First requested feature the merged analysis does not carry with the
    /// requested value.
    fn disagreement(analysis: &Analysis, request: &FeatureSet) -> Option<Feature> {
        request
            .iter()
            .find(|&(feature, value)| analysis.get(feature) != Some(value))
            .map(|(feature, _)| feature)
    }
}

/// Fill unspecified clitic slots from the POS defaults.
fn expand_clitics(request: &FeatureSet, defaults: &FeatureSet) -> FeatureSet {
    let mut expanded = request.clone();
    for feature in Feature::CLITICS {
        if expanded.contains(feature) {
            continue;
        }
        if let Some(value) = defaults.get(feature) {
            expanded.insert(feature, value);
        }
    }
    expanded
}

/// First reason the stem cannot serve the request, if any.
///
/// Voice, rationality and POS are checked before clitics; among clitics only
/// the first conflicting slot is reported.
fn stem_conflict(stem: &StemRecord, request: &FeatureSet) -> Option<(TraceCode, Feature)> {
    let lexical = [
        (Feature::Vox, TraceCode::VoiceMismatch),
        (Feature::Rat, TraceCode::RationalityMismatch),
        (Feature::Pos, TraceCode::PosMismatch),
    ];
    for (feature, code) in lexical {
        if let Some(wanted) = request.get(feature) {
            if stem.get(feature) != Some(wanted) {
                return Some((code, feature));
            }
        }
    }

    Feature::CLITICS
        .into_iter()
        .find(|&feature| match (request.get(feature), stem.get(feature)) {
            (Some(wanted), Some(fixed)) => fixed != NO_CLITIC && fixed != wanted,
            _ => false,
        })
        .map(|feature| (TraceCode::StemCliticMismatch, feature))
}

/// First clitic slot in `slots` where the affix contradicts the request.
///
/// A slot the affix does not fix may still be satisfied by the stem's own
/// value; a requested `"0"` is always satisfied by an affix that is silent
/// on the slot.
fn affix_clitic_conflict(
    slots: &[Feature],
    request: &FeatureSet,
    affix: &AffixRecord,
    stem: &StemRecord,
) -> Option<Feature> {
    slots.iter().copied().find(|&feature| {
        let Some(wanted) = request.get(feature) else {
            return false;
        };
        match affix.get(feature) {
            Some(fixed) => fixed != wanted,
            None => wanted != NO_CLITIC && stem.get(feature).unwrap_or(NO_CLITIC) != wanted,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarf_db::{DatabaseBuilder, FeatureDomain, Morpheme};

    fn fs(text: &str) -> FeatureSet {
        FeatureSet::parse(text).unwrap()
    }

    fn stem_with(features: &str) -> MorphologyDatabase {
        let mut b = DatabaseBuilder::new();
        b.define(Feature::Pos, FeatureDomain::closed(["verb"]));
        for f in Feature::ALL.into_iter().skip(1) {
            b.define(f, FeatureDomain::Open);
        }
        b.add_stem("s_1", "S", Morpheme::new("s").with_features(fs(features)));
        b.build().unwrap()
    }

    #[test]
    fn expand_fills_only_missing_clitics() {
        let defaults = fs("pos:verb asp:p prc0:0 prc1:0 enc0:0");
        let expanded = expand_clitics(&fs("pos:verb prc1:bi_prep"), &defaults);
        assert_eq!(expanded.get(Feature::Prc1), Some("bi_prep"));
        assert_eq!(expanded.get(Feature::Prc0), Some("0"));
        assert_eq!(expanded.get(Feature::Enc0), Some("0"));
        // grammatical features are not defaulted
        assert_eq!(expanded.get(Feature::Asp), None);
        // slots without a default stay unspecified
        assert_eq!(expanded.get(Feature::Prc3), None);
    }

    #[test]
    fn stem_conflict_order() {
        let db = stem_with("pos:verb vox:a rat:n prc1:li_prep");
        let stem = &db.stems("s").unwrap()[0];
        assert_eq!(
            stem_conflict(stem, &fs("vox:p rat:y")),
            Some((TraceCode::VoiceMismatch, Feature::Vox))
        );
        assert_eq!(
            stem_conflict(stem, &fs("rat:y pos:noun")),
            Some((TraceCode::RationalityMismatch, Feature::Rat))
        );
        assert_eq!(
            stem_conflict(stem, &fs("pos:noun")),
            Some((TraceCode::PosMismatch, Feature::Pos))
        );
        assert_eq!(
            stem_conflict(stem, &fs("pos:verb prc1:bi_prep")),
            Some((TraceCode::StemCliticMismatch, Feature::Prc1))
        );
        assert_eq!(stem_conflict(stem, &fs("pos:verb prc1:li_prep")), None);
    }

    #[test]
    fn stem_without_clitic_accepts_any_request() {
        let db = stem_with("pos:verb prc1:0");
        let stem = &db.stems("s").unwrap()[0];
        assert_eq!(stem_conflict(stem, &fs("prc1:bi_prep")), None);
    }

    #[test]
    fn affix_conflict_rules() {
        let db = stem_with("pos:verb prc1:0 prc2:wa_conj");
        let stem = &db.stems("s").unwrap()[0];
        let mut b = DatabaseBuilder::new();
        b.define(Feature::Pos, FeatureDomain::closed(["verb"]))
            .define(Feature::Prc1, FeatureDomain::Open)
            .add_prefix("bi", Morpheme::new("bi").with(Feature::Prc1, "bi_prep"))
            .add_prefix("silent", Morpheme::new(""));
        let affixes = b.build().unwrap();
        let bi = &affixes.prefixes(affixes.category("bi").unwrap()).unwrap()[0];
        let silent = &affixes.prefixes(affixes.category("silent").unwrap()).unwrap()[0];
        let slots = Feature::PROCLITICS;

        // fixed on the affix: must match exactly
        assert_eq!(affix_clitic_conflict(&slots, &fs("prc1:bi_prep"), bi, stem), None);
        assert_eq!(affix_clitic_conflict(&slots, &fs("prc1:0"), bi, stem), Some(Feature::Prc1));
        // silent affix: "0" always fine, otherwise the stem must carry it
        assert_eq!(affix_clitic_conflict(&slots, &fs("prc1:0"), silent, stem), None);
        assert_eq!(
            affix_clitic_conflict(&slots, &fs("prc1:bi_prep"), silent, stem),
            Some(Feature::Prc1)
        );
        assert_eq!(affix_clitic_conflict(&slots, &fs("prc2:wa_conj"), silent, stem), None);
        // first mismatching slot only
        assert_eq!(
            affix_clitic_conflict(&slots, &fs("prc1:bi_prep prc2:fa_conj"), silent, stem),
            Some(Feature::Prc1)
        );
    }

    #[test]
    fn error_from_feature_error() {
        assert_eq!(
            GenerateError::from(FeatureError::UnknownFeature("foo".into())),
            GenerateError::UnknownFeature("foo".into())
        );
        assert_eq!(
            GenerateError::from(FeatureError::MalformedToken("asp".into())),
            GenerateError::MalformedRequest("asp".into())
        );
    }

    #[test]
    fn invalid_value_message() {
        let missing = GenerateError::InvalidFeatureValue {
            feature: Feature::Pos,
            value: None,
        };
        assert_eq!(missing.to_string(), "invalid value for feature pos: <missing>");
        let bad = GenerateError::InvalidFeatureValue {
            feature: Feature::Gen,
            value: Some("x".into()),
        };
        assert_eq!(bad.to_string(), "invalid value for feature gen: x");
    }

    #[test]
    fn default_options() {
        let options = GeneratorOptions::default();
        assert_eq!(options.variant, "msa");
        assert!(!options.diac_only);
    }

    #[test]
    fn generator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator<'static>>();
    }
}
