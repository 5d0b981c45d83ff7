// Merging a prefix, stem and suffix record into one analysis.

use sarf_core::Analysis;
use sarf_db::rewrite::rewrite;
use sarf_db::{AffixRecord, MorphologyDatabase, RewriteRule, StemRecord};

/// How much of an analysis the merger assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Surface form, resolved features, `bw` and `gloss`.
    #[default]
    Full,
    /// Surface form and resolved features; `bw` and `gloss` stay empty.
    DiacOnly,
}

/// Combines one prefix, one stem and one suffix record.
///
/// The caller has already checked that the three records are compatible,
/// so merging never fails and never re-validates.
///
/// Feature precedence, lowest to highest: POS defaults, stem, suffix,
/// prefix. Empty values never override.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMerger<'db> {
    db: &'db MorphologyDatabase,
    rules: &'db [RewriteRule],
    mode: MergeMode,
}

impl<'db> FeatureMerger<'db> {
    /// Create a merger for a dialect variant. A variant without a rewrite
    /// table leaves surface forms as concatenated.
    pub fn new(db: &'db MorphologyDatabase, variant: &str, mode: MergeMode) -> Self {
        Self {
            db,
            rules: db.rewrite_rules(variant).unwrap_or_default(),
            mode,
        }
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Surface form: the three fragments concatenated, then rewritten.
    pub fn surface(&self, prefix: &AffixRecord, stem: &StemRecord, suffix: &AffixRecord) -> String {
        let mut joined =
            String::with_capacity(prefix.diac.len() + stem.diac.len() + suffix.diac.len());
        joined.push_str(&prefix.diac);
        joined.push_str(&stem.diac);
        joined.push_str(&suffix.diac);
        rewrite(self.rules, joined)
    }

    pub fn merge(&self, prefix: &AffixRecord, stem: &StemRecord, suffix: &AffixRecord) -> Analysis {
        let diac = self.surface(prefix, stem, suffix);

        let mut features = stem
            .pos()
            .and_then(|pos| self.db.defaults(pos))
            .cloned()
            .unwrap_or_default();
        features.overlay(&stem.features);
        features.overlay(&suffix.features);
        features.overlay(&prefix.features);

        let (bw, gloss) = match self.mode {
            MergeMode::Full => (
                join_parts([&prefix.bw, &stem.bw, &suffix.bw]),
                join_parts([&prefix.gloss, &stem.gloss, &suffix.gloss]),
            ),
            MergeMode::DiacOnly => (String::new(), String::new()),
        };

        Analysis {
            diac,
            lex: stem.lex.clone(),
            stem: stem.diac.clone(),
            stem_category: self.db.category_name(stem.category).to_string(),
            bw,
            gloss,
            features,
        }
    }
}

/// Join the non-empty parts with `+`.
fn join_parts(parts: [&String; 3]) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarf_core::{Feature, FeatureSet};
    use sarf_db::{DatabaseBuilder, FeatureDomain, Morpheme};

    fn db() -> MorphologyDatabase {
        let mut b = DatabaseBuilder::new();
        b.define(Feature::Pos, FeatureDomain::closed(["verb"]))
            .define(Feature::Asp, FeatureDomain::closed(["p", "i"]))
            .define(Feature::Per, FeatureDomain::closed(["1", "2", "3", "na"]))
            .define(Feature::Gen, FeatureDomain::closed(["m", "f", "na"]))
            .define(Feature::Prc2, FeatureDomain::Open)
            .define(Feature::Enc0, FeatureDomain::Open)
            .default_features(
                FeatureSet::parse("pos:verb asp:p per:na gen:na prc2:0 enc0:0").unwrap(),
            )
            .rewrite("egy", "aa", "A")
            .add_prefix("wa", Morpheme::new("wa").with(Feature::Prc2, "wa_conj").with_bw("wa/CONJ").with_gloss("and"))
            .add_prefix("null", Morpheme::new(""))
            .add_stem(
                "katab_1",
                "PV",
                Morpheme::new("katab")
                    .with(Feature::Pos, "verb")
                    .with(Feature::Gen, "m")
                    .with_bw("katab/PV")
                    .with_gloss("write"),
            )
            .add_suffix(
                "3fs",
                Morpheme::new("at")
                    .with(Feature::Per, "3")
                    .with(Feature::Gen, "f")
                    .with_bw("at/PVSUFF_SUBJ:3FS"),
            )
            .add_suffix("a", Morpheme::new("aa"));
        b.build().unwrap()
    }

    fn records(db: &MorphologyDatabase) -> (&AffixRecord, &AffixRecord, &StemRecord, &AffixRecord, &AffixRecord) {
        let wa = &db.prefixes(db.category("wa").unwrap()).unwrap()[0];
        let null = &db.prefixes(db.category("null").unwrap()).unwrap()[0];
        let stem = &db.stems("katab").unwrap()[0];
        let fs3 = &db.suffixes(db.category("3fs").unwrap()).unwrap()[0];
        let a = &db.suffixes(db.category("a").unwrap()).unwrap()[0];
        (wa, null, stem, fs3, a)
    }

    #[test]
    fn concatenates_surface() {
        let db = db();
        let (wa, _, stem, fs3, _) = records(&db);
        let merger = FeatureMerger::new(&db, "msa", MergeMode::Full);
        assert_eq!(merger.merge(wa, stem, fs3).diac, "wakatabat");
    }

    #[test]
    fn variant_rewrites_surface() {
        let db = db();
        let (_, null, stem, _, a) = records(&db);
        let msa = FeatureMerger::new(&db, "msa", MergeMode::Full);
        let egy = FeatureMerger::new(&db, "egy", MergeMode::Full);
        assert_eq!(msa.merge(null, stem, a).diac, "katabaa");
        assert_eq!(egy.merge(null, stem, a).diac, "katabA");
    }

    #[test]
    fn precedence_default_stem_suffix_prefix() {
        let db = db();
        let (wa, _, stem, fs3, _) = records(&db);
        let merged = FeatureMerger::new(&db, "msa", MergeMode::Full).merge(wa, stem, fs3);
        // default only
        assert_eq!(merged.get(Feature::Asp), Some("p"));
        assert_eq!(merged.get(Feature::Enc0), Some("0"));
        // suffix beats stem
        assert_eq!(merged.get(Feature::Gen), Some("f"));
        // suffix beats default
        assert_eq!(merged.get(Feature::Per), Some("3"));
        // prefix beats default
        assert_eq!(merged.get(Feature::Prc2), Some("wa_conj"));
    }

    #[test]
    fn stem_beats_default() {
        let db = db();
        let (_, null, stem, _, a) = records(&db);
        let merged = FeatureMerger::new(&db, "msa", MergeMode::Full).merge(null, stem, a);
        assert_eq!(merged.get(Feature::Gen), Some("m"));
        assert_eq!(merged.get(Feature::Per), Some("na"));
    }

    #[test]
    fn bw_and_gloss_skip_empty_parts() {
        let db = db();
        let (wa, null, stem, fs3, _) = records(&db);
        let merger = FeatureMerger::new(&db, "msa", MergeMode::Full);
        let with_prefix = merger.merge(wa, stem, fs3);
        assert_eq!(with_prefix.bw, "wa/CONJ+katab/PV+at/PVSUFF_SUBJ:3FS");
        assert_eq!(with_prefix.gloss, "and+write");
        let bare = merger.merge(null, stem, fs3);
        assert_eq!(bare.bw, "katab/PV+at/PVSUFF_SUBJ:3FS");
        assert_eq!(bare.gloss, "write");
    }

    #[test]
    fn lexical_fields_come_from_stem() {
        let db = db();
        let (wa, _, stem, fs3, _) = records(&db);
        let merged = FeatureMerger::new(&db, "msa", MergeMode::Full).merge(wa, stem, fs3);
        assert_eq!(merged.lex, "katab_1");
        assert_eq!(merged.stem, "katab");
        assert_eq!(merged.stem_category, "PV");
    }

    #[test]
    fn diac_only_resolves_features_but_skips_tags() {
        let db = db();
        let (wa, null, stem, fs3, a) = records(&db);
        let merger = FeatureMerger::new(&db, "msa", MergeMode::DiacOnly);
        assert_eq!(merger.mode(), MergeMode::DiacOnly);
        let merged = merger.merge(wa, stem, fs3);
        assert_eq!(merged.diac, "wakatabat");
        assert_eq!(merged.get(Feature::Asp), Some("p"));
        assert_eq!(merged.get(Feature::Gen), Some("f"));
        let full = FeatureMerger::new(&db, "msa", MergeMode::Full).merge(null, stem, a);
        assert_eq!(merger.merge(null, stem, a).features, full.features);
        assert!(merged.bw.is_empty());
        assert!(merged.gloss.is_empty());
    }
}
