//! Projection of provider items onto a comparable record shape.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use super::Source;

/// Provider-agnostic view of one result item.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Display name of the provider the item came from.
    pub source: String,
    /// Normalized title (lowercase, no punctuation, single spaces).
    pub title: String,
    /// Normalized author names.
    pub authors: BTreeSet<String>,
    /// ISBN without separators.
    pub isbn: Option<String>,
    /// The provider item exactly as received.
    pub raw: Value,
    /// Position of the owning provider in the aggregated result list.
    pub origin_index: usize,
}

impl NormalizedRecord {
    /// Source priority used for canonical selection.
    pub fn priority(&self) -> u8 {
        Source::priority_of(&self.source)
    }
}

/// Lowercase, drop punctuation, collapse whitespace runs, trim.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip hyphens and whitespace from an ISBN; `None` if nothing remains.
pub fn normalize_isbn(isbn: &str) -> Option<String> {
    let digits: String = isbn
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Normalize one provider item.
///
/// Returns `None` for unknown sources, unrecognized item shapes, and items
/// without a title. `origin_index` is the position of the owning provider in
/// the aggregated result list.
pub fn normalize(item: &Value, source_name: &str, origin_index: usize) -> Option<NormalizedRecord> {
    let fields = ProviderItem::parse(source_name, item).into_fields()?;

    if fields.title.trim().is_empty() {
        return None;
    }

    Some(NormalizedRecord {
        source: source_name.to_string(),
        title: normalize_text(&fields.title),
        authors: fields
            .authors
            .iter()
            .map(|a| normalize_text(a))
            .filter(|a| !a.is_empty())
            .collect(),
        isbn: fields.isbn.as_deref().and_then(normalize_isbn),
        raw: item.clone(),
        origin_index,
    })
}

struct RawFields {
    title: String,
    authors: Vec<String>,
    isbn: Option<String>,
}

/// Known provider item shapes, plus a catch-all that never normalizes.
enum ProviderItem {
    GoogleBooks(GoogleVolume),
    OpenLibrary(OpenLibraryDoc),
    Libris(LibrisRecord),
    Unknown,
}

impl ProviderItem {
    fn parse(source_name: &str, item: &Value) -> Self {
        let parsed = match Source::from_name(source_name) {
            Some(Source::GoogleBooks) => GoogleVolume::deserialize(item).map(Self::GoogleBooks).ok(),
            Some(Source::OpenLibrary) => OpenLibraryDoc::deserialize(item).map(Self::OpenLibrary).ok(),
            Some(Source::Libris) => LibrisRecord::deserialize(item).map(Self::Libris).ok(),
            None => None,
        };
        parsed.unwrap_or(Self::Unknown)
    }

    fn into_fields(self) -> Option<RawFields> {
        match self {
            ProviderItem::GoogleBooks(volume) => {
                let info = volume.volume_info?;
                let isbn = info
                    .industry_identifiers
                    .into_iter()
                    .find(|id| matches!(id.kind.as_deref(), Some("ISBN_13" | "ISBN_10")))
                    .and_then(|id| id.identifier);
                Some(RawFields { title: info.title?, authors: info.authors, isbn })
            }
            ProviderItem::OpenLibrary(doc) => {
                Some(RawFields { title: doc.title?, authors: doc.author_name, isbn: doc.isbn.into_iter().next() })
            }
            ProviderItem::Libris(record) => Some(RawFields {
                title: record.title?.into_first()?,
                authors: record.author.or(record.creator).map(OneOrMany::into_vec).unwrap_or_default(),
                isbn: record.isbn.and_then(OneOrMany::into_first),
            }),
            ProviderItem::Unknown => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryDoc {
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LibrisRecord {
    title: Option<OneOrMany>,
    author: Option<OneOrMany>,
    creator: Option<OneOrMany>,
    isbn: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_first(self) -> Option<String> {
        match self {
            OneOrMany::One(s) => Some(s),
            OneOrMany::Many(v) => v.into_iter().next(),
        }
    }

    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}
