// Sectioned text format: parsing into a DatabaseBuilder.
//
// Layout:
//
//   ###DEFINES###        DEFINE pos pos:verb pos:noun   |  DEFINE rat *
//   ###DEFAULTS###       DEFAULT pos:verb asp:p prc0:0 ...
//   ###TOKENIZATIONS###  TOKENIZATION prc0 prc1 enc0
//   ###REWRITES###       REWRITE<TAB>variant<TAB>regex<TAB>replacement
//   ###PREFIXES###       diac<TAB>category<TAB>feat:val ...
//   ###SUFFIXES###       diac<TAB>category<TAB>feat:val ...
//   ###STEMS###          diac<TAB>category<TAB>lex:x feat:val ...
//   ###TABLE AB###       prefix_category stem_category
//   ###TABLE BC###       stem_category suffix_category
//   ###TABLE AC###       prefix_category suffix_category
//
// Blank lines and lines starting with '#' (other than section headers) are
// skipped. Unknown sections are skipped whole.

use std::path::Path;

use sarf_core::{Feature, FeatureError};
use tracing::{debug, info};

use crate::DbError;
use crate::builder::DatabaseBuilder;
use crate::database::{FeatureDomain, MorphologyDatabase};
use crate::record::Morpheme;

/// Row keys that fill record fields instead of grammatical features.
const KEY_DIAC: &str = "diac";
const KEY_BW: &str = "bw";
const KEY_GLOSS: &str = "gloss";
const KEY_LEX: &str = "lex";

/// DEFINE value list meaning "any value".
const OPEN_DOMAIN: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Defines,
    Defaults,
    Tokenizations,
    Rewrites,
    Prefixes,
    Suffixes,
    Stems,
    TableAb,
    TableBc,
    TableAc,
    Skipped,
}

impl Section {
    fn from_header(name: &str) -> Section {
        match name {
            "DEFINES" => Section::Defines,
            "DEFAULTS" => Section::Defaults,
            "TOKENIZATIONS" => Section::Tokenizations,
            "REWRITES" => Section::Rewrites,
            "PREFIXES" => Section::Prefixes,
            "SUFFIXES" => Section::Suffixes,
            "STEMS" => Section::Stems,
            "TABLE AB" => Section::TableAb,
            "TABLE BC" => Section::TableBc,
            "TABLE AC" => Section::TableAc,
            _ => Section::Skipped,
        }
    }
}

impl MorphologyDatabase {
    /// Parse a database from its text form.
    pub fn parse(text: &str) -> Result<Self, DbError> {
        parse_into_builder(text)?.build()
    }

    /// Read and parse a database file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        info!(path = %path.display(), bytes = text.len(), "loading morphology database");
        Self::parse(&text)
    }
}

/// Parse the text form into a builder without validating it.
pub fn parse_into_builder(text: &str) -> Result<DatabaseBuilder, DbError> {
    let mut builder = DatabaseBuilder::new();
    let mut section = Section::Preamble;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');

        if let Some(name) = line
            .strip_prefix("###")
            .and_then(|rest| rest.strip_suffix("###"))
        {
            section = Section::from_header(name.trim());
            if section == Section::Skipped {
                debug!(line = line_no, section = name, "skipping unknown section");
            }
            continue;
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let syntax = |message: String| DbError::Syntax {
            line: line_no,
            message,
        };

        match section {
            Section::Preamble => {
                return Err(syntax("content before the first section header".into()));
            }
            Section::Skipped => {}
            Section::Defines => parse_define(&mut builder, line).map_err(syntax)?,
            Section::Defaults => {
                let rest = keyword_rest(line, "DEFAULT").map_err(syntax)?;
                let features = sarf_core::FeatureSet::parse(rest)
                    .map_err(|e| syntax(e.to_string()))?;
                builder.default_features(features);
            }
            Section::Tokenizations => {
                let rest = keyword_rest(line, "TOKENIZATION").map_err(syntax)?;
                for name in rest.split_whitespace() {
                    let feature: Feature = name.parse().map_err(|e: FeatureError| syntax(e.to_string()))?;
                    builder.tokenization(feature);
                }
            }
            Section::Rewrites => {
                let fields: Vec<&str> = line.split('\t').collect();
                match fields.as_slice() {
                    ["REWRITE", variant, pattern, replacement] => {
                        builder.rewrite(variant, pattern, replacement);
                    }
                    _ => {
                        return Err(syntax(
                            "expected REWRITE<TAB>variant<TAB>pattern<TAB>replacement".into(),
                        ));
                    }
                }
            }
            Section::Prefixes => {
                let (category, morpheme, _) = parse_row(line).map_err(syntax)?;
                builder.add_prefix(category, morpheme);
            }
            Section::Suffixes => {
                let (category, morpheme, _) = parse_row(line).map_err(syntax)?;
                builder.add_suffix(category, morpheme);
            }
            Section::Stems => {
                let (category, morpheme, lex) = parse_row(line).map_err(syntax)?;
                let lex = lex.ok_or_else(|| syntax("stem row without lex".into()))?;
                builder.add_stem(&lex, category, morpheme);
            }
            Section::TableAb => {
                let (prefix, stem) = parse_pair(line).map_err(syntax)?;
                builder.stem_prefix(stem, prefix);
            }
            Section::TableBc => {
                let (stem, suffix) = parse_pair(line).map_err(syntax)?;
                builder.stem_suffix(stem, suffix);
            }
            Section::TableAc => {
                let (prefix, suffix) = parse_pair(line).map_err(syntax)?;
                builder.prefix_suffix(prefix, suffix);
            }
        }
    }

    Ok(builder)
}

fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Result<&'a str, String> {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) if head == keyword => Ok(rest),
        None if line == keyword => Ok(""),
        _ => Err(format!("expected {keyword} line")),
    }
}

/// `DEFINE feat feat:v1 feat:v2 ...` or `DEFINE feat *`.
fn parse_define(builder: &mut DatabaseBuilder, line: &str) -> Result<(), String> {
    let rest = keyword_rest(line, "DEFINE")?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next().ok_or("DEFINE without a feature name")?;
    let values: Vec<&str> = tokens.collect();

    if [KEY_DIAC, KEY_BW, KEY_GLOSS, KEY_LEX].contains(&name) {
        // record fields are always free text
        return Ok(());
    }
    let feature: Feature = name.parse().map_err(|e: FeatureError| e.to_string())?;

    let domain = if values.is_empty() || values == [OPEN_DOMAIN] {
        FeatureDomain::Open
    } else {
        let prefix = format!("{name}:");
        FeatureDomain::closed(
            values
                .into_iter()
                .map(|v| v.strip_prefix(prefix.as_str()).unwrap_or(v)),
        )
    };
    builder.define(feature, domain);
    Ok(())
}

/// `diac<TAB>category<TAB>features`; returns the lex field separately.
fn parse_row(line: &str) -> Result<(&str, Morpheme, Option<String>), String> {
    let mut fields = line.split('\t');
    let diac = fields.next().unwrap_or_default();
    let category = fields
        .next()
        .filter(|c| !c.is_empty())
        .ok_or("row without a category field")?;
    let analysis = fields.next().unwrap_or_default();
    if fields.next().is_some() {
        return Err("too many tab-separated fields".into());
    }

    let mut morpheme = Morpheme::new(diac);
    let mut lex = None;
    for token in analysis.split_whitespace() {
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| format!("malformed feature token {token:?}"))?;
        match key {
            KEY_DIAC => morpheme.diac = value.to_string(),
            KEY_BW => morpheme.bw = value.to_string(),
            KEY_GLOSS => morpheme.gloss = value.to_string(),
            KEY_LEX => lex = Some(value.to_string()),
            _ => {
                let feature: Feature = key.parse().map_err(|e: FeatureError| e.to_string())?;
                morpheme.features.insert(feature, value);
            }
        }
    }
    Ok((category, morpheme, lex))
}

fn parse_pair(line: &str) -> Result<(&str, &str), String> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err("expected two category names".into()),
    }
}
