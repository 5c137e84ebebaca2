//! Shared dataset types used across all pipeline stages.
//!
//! These types are serialized into every generated artifact (consolidated
//! documents, per-chapter files, the chapter index) and must stay identical
//! across the assembly and materialization modules.

use serde::{Deserialize, Serialize};

/// Revelation place of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterType {
    Meccan,
    Medinan,
}

/// A single verse within a chapter.
///
/// `tajweed` is always serialized; `null` marks a verse whose annotated
/// text could not be fetched. `translation` and `transliteration` are
/// omitted entirely when absent, so the base document stays free of
/// translation fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    /// 1-based position within the chapter.
    pub id: u32,
    /// Uthmani-script verse text.
    pub text: String,
    /// Recitation-annotated markup, `null` when unavailable.
    pub tajweed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

/// One of the 114 chapters, fully assembled for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Canonical chapter number (1..=114).
    pub id: u32,
    /// Arabic-script title.
    pub name: String,
    /// Romanized title.
    pub transliteration: String,
    /// Translated title, absent on the base document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChapterType,
    pub total_verses: usize,
    pub verses: Vec<Verse>,
}

/// Which document a pipeline run is assembling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLang {
    /// The canonical document: source text only, no translation fields.
    Base,
    /// Romanization treated as a language for assembly purposes.
    Transliteration,
    /// A real translation language, e.g. `en` or `ha_gumi`.
    Translation(String),
}

impl DocumentLang {
    /// Language code as it appears in file names and translation maps.
    /// The base document has no code.
    pub fn code(&self) -> Option<&str> {
        match self {
            DocumentLang::Base => None,
            DocumentLang::Transliteration => Some("transliteration"),
            DocumentLang::Translation(code) => Some(code),
        }
    }

    /// Chapter metadata language for this document. The base and
    /// transliteration documents use the English metadata.
    pub fn metadata_code(&self) -> &str {
        match self {
            DocumentLang::Base | DocumentLang::Transliteration => "en",
            DocumentLang::Translation(code) => code,
        }
    }

    /// File name of the consolidated document artifact.
    pub fn filename(&self) -> String {
        match self.code() {
            Some(code) => format!("quran_{code}.json"),
            None => "quran.json".to_string(),
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, DocumentLang::Base)
    }

    pub fn is_transliteration(&self) -> bool {
        matches!(self, DocumentLang::Transliteration)
    }
}

/// A fully assembled language document: the in-memory unit passed between
/// the assembly, cross-merge, and materialization stages. Only `chapters`
/// is serialized; `lang` selects file names and translation-map keys.
#[derive(Debug, Clone)]
pub struct Quran {
    pub lang: DocumentLang,
    pub chapters: Vec<Chapter>,
}

impl Quran {
    /// Total verse count across all chapters.
    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }
}

/// Serialize an artifact: compact by default, indented when `pretty`.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
