// Diagnostic trace codes and the per-call trace log

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a candidate was pruned, or that generation succeeded.
///
/// Each variant has a short machine-readable code (see [`TraceCode::code`])
/// and a human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraceCode {
    /// Lemma not present in the stem index.
    LemmaNotFound,
    /// Requested features are not a subset of the POS default features.
    NotDefaultSubset,
    /// Stem voice differs from the requested voice.
    VoiceMismatch,
    /// Stem rationality differs from the requested rationality.
    RationalityMismatch,
    /// Stem POS differs from the requested POS.
    PosMismatch,
    /// A clitic fixed on the stem conflicts with the request.
    StemCliticMismatch,
    /// A licensed prefix category has no prefix records.
    NoPrefixRecords,
    /// A prefix record's proclitics conflict with the request.
    ProcliticMismatch,
    /// A licensed suffix category has no suffix records.
    NoSuffixRecords,
    /// The prefix and suffix categories are not licensed together.
    PrefixSuffixIncompatible,
    /// A suffix record's enclitics conflict with the request.
    EncliticMismatch,
    /// The merged features disagree with the request.
    MergedMismatch,
    /// At least one analysis was generated.
    Ok,
}

impl TraceCode {
    /// Short code, e.g. `PP0`.
    pub fn code(self) -> &'static str {
        match self {
            TraceCode::LemmaNotFound => "L0",
            TraceCode::NotDefaultSubset => "FD0",
            TraceCode::VoiceMismatch => "XVox0",
            TraceCode::RationalityMismatch => "XRat0",
            TraceCode::PosMismatch => "XPos0",
            TraceCode::StemCliticMismatch => "FXC0",
            TraceCode::NoPrefixRecords => "XP0",
            TraceCode::ProcliticMismatch => "PP0",
            TraceCode::NoSuffixRecords => "XS0",
            TraceCode::PrefixSuffixIncompatible => "PS0",
            TraceCode::EncliticMismatch => "FSE0",
            TraceCode::MergedMismatch => "M0",
            TraceCode::Ok => "OK",
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            TraceCode::LemmaNotFound => "lemma not found in the stem index",
            TraceCode::NotDefaultSubset => {
                "requested features are not a subset of the default features"
            }
            TraceCode::VoiceMismatch => "no stem with same voice",
            TraceCode::RationalityMismatch => "no stem with same rationality",
            TraceCode::PosMismatch => "no stem with same POS",
            TraceCode::StemCliticMismatch => {
                "no stem clitic value matches the requested clitic value"
            }
            TraceCode::NoPrefixRecords => "no prefix records for a licensed prefix category",
            TraceCode::ProcliticMismatch => {
                "no prefix proclitic value matches the requested proclitic value"
            }
            TraceCode::NoSuffixRecords => "no suffix records for a licensed suffix category",
            TraceCode::PrefixSuffixIncompatible => "prefix and suffix categories do not match",
            TraceCode::EncliticMismatch => {
                "no suffix enclitic value matches the requested enclitic value"
            }
            TraceCode::MergedMismatch => "merged features do not adhere to requested features",
            TraceCode::Ok => "OK",
        }
    }
}

impl fmt::Display for TraceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One trace record: a code plus optional context (a feature or category).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceEntry {
    pub code: TraceCode,
    pub detail: Option<String>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({}: {})", self.code, self.code.reason(), detail),
            None => write!(f, "{} ({})", self.code, self.code.reason()),
        }
    }
}

/// Ordered, append-only log of trace entries for one generation call.
///
/// Entries keep the order in which candidates were pruned, so the first
/// entries tell which compatibility stage cut the search first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugTrace {
    entries: Vec<TraceEntry>,
}

impl DebugTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: TraceCode) {
        self.entries.push(TraceEntry { code, detail: None });
    }

    pub fn push_detail(&mut self, code: TraceCode, detail: impl Into<String>) {
        self.entries.push(TraceEntry {
            code,
            detail: Some(detail.into()),
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Codes in log order (with repeats).
    pub fn codes(&self) -> impl Iterator<Item = TraceCode> + '_ {
        self.entries.iter().map(|e| e.code)
    }

    /// Distinct codes seen, independent of order and multiplicity.
    pub fn code_set(&self) -> BTreeSet<TraceCode> {
        self.codes().collect()
    }

    pub fn contains(&self, code: TraceCode) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    /// Number of entries with the given code.
    pub fn count(&self, code: TraceCode) -> usize {
        self.entries.iter().filter(|e| e.code == code).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
