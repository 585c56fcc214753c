//! Compact summaries of OpenAlex and Crossref search responses.
//!
//! Both formatters return the payload untouched when summaries are off or
//! the payload does not look like a search response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const MAX_AUTHORS: usize = 3;
const MAX_ABSTRACT_CHARS: usize = 300;
const MAX_TOPICS: usize = 3;
const MIN_CONCEPT_SCORE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAlexSummary {
    pub title: String,
    pub authors: String,
    pub year: Option<i64>,
    pub publication_date: Option<String>,
    pub doi: Option<String>,
    pub citations: u64,
    pub open_access: bool,
    pub open_access_url: Option<String>,
    pub journal: Option<String>,
    pub source_type: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub concepts: Vec<String>,
    pub openalex_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossrefSummary {
    pub title: String,
    pub authors: String,
    pub year: Option<i64>,
    pub doi: Option<String>,
    pub citations: u64,
    pub journal: Option<String>,
    pub publisher: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub subjects: Vec<String>,
    pub url: Option<String>,
    pub crossref_url: Option<String>,
}

/// Summarize an OpenAlex `/works` response.
pub fn format_openalex(response: Value, summary_mode: bool) -> Value {
    if !summary_mode {
        return response;
    }
    let Some(works) = response.get("results").and_then(Value::as_array) else {
        return response;
    };

    let results: Vec<OpenAlexSummary> = works.iter().map(summarize_openalex).collect();
    let meta = response.get("meta");
    let meta_u64 = |key: &str| meta.and_then(|m| m.get(key)).and_then(Value::as_u64);

    json!({
        "meta": {
            "count": meta_u64("count").unwrap_or(0),
            "db_response_time_ms": meta_u64("db_response_time_ms"),
            "page": meta_u64("page").unwrap_or(1),
            "per_page": meta_u64("per_page").unwrap_or(25),
            "summary_mode": true,
        },
        "results": results,
    })
}

/// Summarize a Crossref `/works` response.
pub fn format_crossref(response: Value, summary_mode: bool) -> Value {
    if !summary_mode {
        return response;
    }
    let Some(message) = response.get("message") else {
        return response;
    };
    let Some(works) = message.get("items").and_then(Value::as_array) else {
        return response;
    };

    let items: Vec<CrossrefSummary> = works.iter().map(summarize_crossref).collect();

    json!({
        "status": response.get("status"),
        "message": {
            "total_results": message.get("total-results").and_then(Value::as_u64).unwrap_or(0),
            "items_per_page": message.get("items-per-page").and_then(Value::as_u64).unwrap_or(20),
            "query": message.get("query"),
            "summary_mode": true,
            "items": items,
        },
    })
}

pub fn summarize_openalex(work: &Value) -> OpenAlexSummary {
    let work = OpenAlexWork::deserialize(work).unwrap_or_default();

    let names: Vec<String> = work
        .authorships
        .iter()
        .take(MAX_AUTHORS)
        .filter_map(|a| a.author.as_ref()?.display_name.clone())
        .filter(|n| !n.is_empty())
        .collect();

    let concepts = work
        .concepts
        .iter()
        .filter(|c| c.score.is_some_and(|s| s > MIN_CONCEPT_SCORE))
        .filter_map(|c| c.display_name.clone())
        .take(MAX_TOPICS)
        .collect();

    let source = work.primary_location.and_then(|l| l.source);
    let open_access = work.open_access.unwrap_or_default();

    OpenAlexSummary {
        title: work
            .display_name
            .or(work.title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".into()),
        authors: author_line(names, work.authorships.len()),
        year: work.publication_year,
        publication_date: work.publication_date,
        url: work.doi.as_deref().map(doi_url),
        doi: work.doi,
        citations: work.cited_by_count.unwrap_or(0),
        open_access: work.is_oa.or(open_access.is_oa).unwrap_or(false),
        open_access_url: open_access.oa_url,
        journal: source.as_ref().and_then(|s| s.display_name.clone()),
        source_type: source.and_then(|s| s.kind),
        abstract_text: work
            .abstract_inverted_index
            .as_ref()
            .map(rebuild_abstract)
            .unwrap_or_default(),
        work_type: work.kind,
        language: work.language,
        concepts,
        openalex_id: work.id,
    }
}

pub fn summarize_crossref(work: &Value) -> CrossrefSummary {
    let work = CrossrefWork::deserialize(work).unwrap_or_default();

    let names: Vec<String> = work
        .author
        .iter()
        .take(MAX_AUTHORS)
        .map(|a| format!("{} {}", a.given.as_deref().unwrap_or(""), a.family.as_deref().unwrap_or("")))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    let year = first_year(work.published_print.as_ref()).or_else(|| first_year(work.published_online.as_ref()));

    CrossrefSummary {
        title: work
            .title
            .and_then(OneOrMany::into_first)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".into()),
        authors: author_line(names, work.author.len()),
        year,
        url: work.doi.as_deref().map(doi_url).or_else(|| work.url.clone()),
        doi: work.doi,
        citations: work.is_referenced_by_count.unwrap_or(0),
        journal: work.container_title.and_then(OneOrMany::into_first),
        publisher: work.publisher,
        work_type: work.kind,
        abstract_text: truncate(work.abstract_text.as_deref().unwrap_or("")),
        subjects: work.subject.into_iter().take(MAX_TOPICS).collect(),
        crossref_url: work.url,
    }
}

fn author_line(names: Vec<String>, total: usize) -> String {
    if names.is_empty() {
        return "Unknown authors".into();
    }
    let mut line = names.join(", ");
    if total > MAX_AUTHORS {
        line.push_str(" et al.");
    }
    line
}

/// Rebuild abstract text from OpenAlex's word -> positions index.
fn rebuild_abstract(index: &BTreeMap<String, Vec<usize>>) -> String {
    let mut words: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    words.sort_by_key(|(position, _)| *position);
    let text = words.into_iter().map(|(_, w)| w).collect::<Vec<_>>().join(" ");
    truncate(&text)
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_ABSTRACT_CHARS {
        let cut: String = text.chars().take(MAX_ABSTRACT_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Resolver URL for a DOI given bare or already as a URL.
fn doi_url(doi: &str) -> String {
    if doi.starts_with("http") { doi.to_string() } else { format!("https://doi.org/{doi}") }
}

fn first_year(date: Option<&DateParts>) -> Option<i64> {
    date?.date_parts.first()?.first().copied().flatten()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenAlexWork {
    id: Option<String>,
    doi: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i64>,
    publication_date: Option<String>,
    cited_by_count: Option<u64>,
    is_oa: Option<bool>,
    authorships: Vec<Authorship>,
    primary_location: Option<Location>,
    abstract_inverted_index: Option<BTreeMap<String, Vec<usize>>>,
    concepts: Vec<Concept>,
    open_access: Option<OpenAccess>,
    language: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Authorship {
    author: Option<NamedEntity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedEntity {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    source: Option<LocationSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocationSource {
    display_name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Concept {
    display_name: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenAccess {
    is_oa: Option<bool>,
    oa_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct CrossrefWork {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    title: Option<OneOrMany>,
    author: Vec<CrossrefAuthor>,
    published_print: Option<DateParts>,
    published_online: Option<DateParts>,
    is_referenced_by_count: Option<u64>,
    container_title: Option<OneOrMany>,
    publisher: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    subject: Vec<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct DateParts {
    date_parts: Vec<Vec<Option<i64>>>,
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
}
