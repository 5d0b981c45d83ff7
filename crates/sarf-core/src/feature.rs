// Closed grammatical feature vocabulary and feature bundles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value of a clitic slot meaning "no clitic in this slot".
///
/// Distinct from an absent key, which leaves the slot unspecified.
pub const NO_CLITIC: &str = "0";

/// Error type for feature name and feature bundle parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("malformed feature token {0:?} (expected name:value)")]
    MalformedToken(String),
}

/// A grammatical feature name.
///
/// The vocabulary is closed: anything outside it is rejected when parsed,
/// so the rest of the engine never sees free-form feature names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "pos")]
    Pos,
    #[serde(rename = "asp")]
    Asp,
    #[serde(rename = "per")]
    Per,
    #[serde(rename = "gen")]
    Gen,
    #[serde(rename = "num")]
    Num,
    #[serde(rename = "vox")]
    Vox,
    #[serde(rename = "mod")]
    Mod,
    #[serde(rename = "stt")]
    Stt,
    #[serde(rename = "cas")]
    Cas,
    #[serde(rename = "rat")]
    Rat,
    #[serde(rename = "prc0")]
    Prc0,
    #[serde(rename = "prc1")]
    Prc1,
    #[serde(rename = "prc1.5")]
    Prc1_5,
    #[serde(rename = "prc2")]
    Prc2,
    #[serde(rename = "prc3")]
    Prc3,
    #[serde(rename = "enc0")]
    Enc0,
    #[serde(rename = "enc1")]
    Enc1,
    #[serde(rename = "enc2")]
    Enc2,
}

impl Feature {
    /// Every feature, in canonical order.
    pub const ALL: [Feature; 18] = [
        Feature::Pos,
        Feature::Asp,
        Feature::Per,
        Feature::Gen,
        Feature::Num,
        Feature::Vox,
        Feature::Mod,
        Feature::Stt,
        Feature::Cas,
        Feature::Rat,
        Feature::Prc0,
        Feature::Prc1,
        Feature::Prc1_5,
        Feature::Prc2,
        Feature::Prc3,
        Feature::Enc0,
        Feature::Enc1,
        Feature::Enc2,
    ];

    /// Proclitic slots, innermost first.
    pub const PROCLITICS: [Feature; 5] = [
        Feature::Prc0,
        Feature::Prc1,
        Feature::Prc1_5,
        Feature::Prc2,
        Feature::Prc3,
    ];

    /// Enclitic slots, innermost first.
    pub const ENCLITICS: [Feature; 3] = [Feature::Enc0, Feature::Enc1, Feature::Enc2];

    /// All eight clitic slots: proclitics followed by enclitics.
    pub const CLITICS: [Feature; 8] = [
        Feature::Prc0,
        Feature::Prc1,
        Feature::Prc1_5,
        Feature::Prc2,
        Feature::Prc3,
        Feature::Enc0,
        Feature::Enc1,
        Feature::Enc2,
    ];

    /// The feature name as written in databases and requests.
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Pos => "pos",
            Feature::Asp => "asp",
            Feature::Per => "per",
            Feature::Gen => "gen",
            Feature::Num => "num",
            Feature::Vox => "vox",
            Feature::Mod => "mod",
            Feature::Stt => "stt",
            Feature::Cas => "cas",
            Feature::Rat => "rat",
            Feature::Prc0 => "prc0",
            Feature::Prc1 => "prc1",
            Feature::Prc1_5 => "prc1.5",
            Feature::Prc2 => "prc2",
            Feature::Prc3 => "prc3",
            Feature::Enc0 => "enc0",
            Feature::Enc1 => "enc1",
            Feature::Enc2 => "enc2",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FeatureError::UnknownFeature(s.to_string()))
    }
}

/// A bundle of grammatical feature values.
///
/// A missing key means the feature is unspecified. Iteration follows the
/// canonical [`Feature::ALL`] order, which keeps printed output and
/// serialized forms stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<Feature, String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace-separated list of `name:value` tokens,
    /// e.g. `"pos:verb asp:p per:3"`.
    ///
    /// The value is everything after the first colon, so values may
    /// themselves contain colons. Later tokens replace earlier ones.
    pub fn parse(text: &str) -> Result<Self, FeatureError> {
        let mut set = Self::new();
        for token in text.split_whitespace() {
            let (name, value) = token
                .split_once(':')
                .ok_or_else(|| FeatureError::MalformedToken(token.to_string()))?;
            set.insert(name.parse()?, value);
        }
        Ok(set)
    }

    /// Builder-style insert.
    pub fn with(mut self, feature: Feature, value: impl Into<String>) -> Self {
        self.insert(feature, value);
        self
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, feature: Feature, value: impl Into<String>) -> Option<String> {
        self.values.insert(feature, value.into())
    }

    pub fn get(&self, feature: Feature) -> Option<&str> {
        self.values.get(&feature).map(String::as_str)
    }

    pub fn remove(&mut self, feature: Feature) -> Option<String> {
        self.values.remove(&feature)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.values.contains_key(&feature)
    }

    /// Iterate over `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &str)> + '_ {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = Feature> + '_ {
        self.values.keys().copied()
    }

    /// Whether every key of `self` is also a key of `other`.
    pub fn keys_subset_of(&self, other: &FeatureSet) -> bool {
        self.values.keys().all(|k| other.values.contains_key(k))
    }

    /// Copy every non-empty value of `other` over `self`.
    pub fn overlay(&mut self, other: &FeatureSet) {
        for (feature, value) in other.iter() {
            if !value.is_empty() {
                self.insert(feature, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Feature, String)> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = (Feature, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl FromStr for FeatureSet {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (feature, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{feature}:{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>(), Ok(feature));
        }
    }

    #[test]
    fn dotted_proclitic_name() {
        assert_eq!("prc1.5".parse::<Feature>(), Ok(Feature::Prc1_5));
        assert_eq!(Feature::Prc1_5.to_string(), "prc1.5");
    }

    #[test]
    fn unknown_feature_rejected() {
        assert_eq!(
            "caphi".parse::<Feature>(),
            Err(FeatureError::UnknownFeature("caphi".to_string()))
        );
    }

    #[test]
    fn clitic_groups() {
        assert!(Feature::PROCLITICS.contains(&Feature::Prc3));
        assert!(!Feature::ENCLITICS.contains(&Feature::Prc3));
        assert!(Feature::CLITICS.contains(&Feature::Enc2));
        assert!(!Feature::CLITICS.contains(&Feature::Asp));
        assert_eq!(Feature::CLITICS.len(), 8);
    }

    #[test]
    fn parse_feature_set() {
        let fs = FeatureSet::parse("pos:verb  asp:p per:3").unwrap();
        assert_eq!(fs.len(), 3);
        assert_eq!(fs.get(Feature::Pos), Some("verb"));
        assert_eq!(fs.get(Feature::Per), Some("3"));
        assert_eq!(fs.get(Feature::Gen), None);
    }

    #[test]
    fn parse_keeps_colons_in_value() {
        let fs = FeatureSet::parse("enc0:3ms:dobj").unwrap();
        assert_eq!(fs.get(Feature::Enc0), Some("3ms:dobj"));
    }

    #[test]
    fn parse_rejects_bare_token() {
        assert_eq!(
            FeatureSet::parse("pos:verb asp"),
            Err(FeatureError::MalformedToken("asp".to_string()))
        );
    }

    #[test]
    fn parse_rejects_unknown_name() {
        assert!(matches!(
            FeatureSet::parse("pos:verb foo:bar"),
            Err(FeatureError::UnknownFeature(name)) if name == "foo"
        ));
    }

    #[test]
    fn display_is_canonical_order() {
        let fs = FeatureSet::new()
            .with(Feature::Enc0, "0")
            .with(Feature::Asp, "p")
            .with(Feature::Pos, "verb");
        assert_eq!(fs.to_string(), "pos:verb asp:p enc0:0");
    }

    #[test]
    fn overlay_skips_empty_values() {
        let mut base = FeatureSet::new().with(Feature::Gen, "m").with(Feature::Num, "s");
        let top = FeatureSet::new().with(Feature::Gen, "f").with(Feature::Num, "");
        base.overlay(&top);
        assert_eq!(base.get(Feature::Gen), Some("f"));
        assert_eq!(base.get(Feature::Num), Some("s"));
    }

    #[test]
    fn subset_check() {
        let small = FeatureSet::parse("pos:noun").unwrap();
        let big = FeatureSet::parse("pos:noun gen:m").unwrap();
        assert!(small.keys_subset_of(&big));
        assert!(!big.keys_subset_of(&small));
    }

    #[test]
    fn serializes_as_plain_object() {
        let fs = FeatureSet::parse("pos:verb prc1.5:0").unwrap();
        let json = serde_json::to_string(&fs).unwrap();
        assert_eq!(json, r#"{"pos":"verb","prc1.5":"0"}"#);
        let back: FeatureSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fs);
    }
}
