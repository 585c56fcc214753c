//! Rebuilding per-provider payloads from clustered records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cluster::{Cluster, build_clusters};
use super::normalize::normalize;
use super::{Source, SourceResult};

/// Per-provider counters attached to a deduplicated payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeduplicationStats {
    /// Items the provider returned.
    pub original_count: usize,
    /// Canonical records that stayed under this provider.
    pub deduplicated_count: usize,
    pub removed_duplicates: usize,
}

/// Output of [`deduplicate`].
#[derive(Debug, Clone)]
pub struct Deduplicated {
    /// Provider results in input order, payloads rewritten where possible.
    pub results: Vec<SourceResult>,
    pub clusters: Vec<Cluster>,
}

impl Deduplicated {
    /// Total records dropped across all providers.
    pub fn removed_duplicates(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.results.as_ref()?.get("deduplication")?.get("removed_duplicates")?.as_u64())
            .sum::<u64>() as usize
    }
}

/// Collapse near-duplicate book records across providers.
///
/// Failed providers and payloads of an unrecognized shape pass through
/// untouched. Every other payload has its item list replaced by the
/// canonical records that originated from it, plus a `deduplication` block.
pub fn deduplicate(results: Vec<SourceResult>, threshold: f64) -> Deduplicated {
    let mut original_counts: Vec<Option<usize>> = vec![None; results.len()];
    let mut records = Vec::new();

    for (index, result) in results.iter().enumerate() {
        let Some(items) = result_items(result) else {
            continue;
        };
        original_counts[index] = Some(items.len());
        records.extend(items.iter().filter_map(|item| normalize(item, &result.source, index)));
    }

    let clusters = build_clusters(records, threshold);

    let mut kept: Vec<Vec<Value>> = vec![Vec::new(); results.len()];
    for cluster in &clusters {
        let canonical = cluster.canonical();
        kept[canonical.origin_index].push(canonical.raw.clone());
    }

    let results = results
        .into_iter()
        .zip(original_counts)
        .zip(kept)
        .map(|((result, original_count), items)| match original_count {
            Some(original_count) => rewrite(result, items, original_count),
            None => result,
        })
        .collect();

    Deduplicated { results, clusters }
}

fn rewrite(mut result: SourceResult, items: Vec<Value>, original_count: usize) -> SourceResult {
    let stats = DeduplicationStats {
        original_count,
        deduplicated_count: items.len(),
        removed_duplicates: original_count.saturating_sub(items.len()),
    };

    let pointer = result
        .results
        .as_ref()
        .zip(Source::from_name(&result.source))
        .and_then(|(payload, source)| items_pointer(source, payload));

    if let (Some(pointer), Some(payload)) = (pointer, result.results.as_mut()) {
        if let Some(slot) = payload.pointer_mut(pointer) {
            *slot = Value::Array(items);
        }
        if let Some(object) = payload.as_object_mut() {
            object.insert("deduplication".into(), serde_json::json!(stats));
        }
    }

    result
}

fn result_items(result: &SourceResult) -> Option<&Vec<Value>> {
    if !result.is_success() {
        return None;
    }
    let source = Source::from_name(&result.source)?;
    let payload = result.results.as_ref()?;
    payload.pointer(items_pointer(source, payload)?)?.as_array()
}

/// JSON pointer to the item array of a source's search payload.
fn items_pointer(source: Source, payload: &Value) -> Option<&'static str> {
    let candidates: &[&'static str] = match source {
        Source::GoogleBooks => &["/items"],
        Source::OpenLibrary => &["/docs"],
        Source::Libris => &["/xsearch/list", "/list"],
    };
    candidates
        .iter()
        .copied()
        .find(|p| payload.pointer(p).is_some_and(Value::is_array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::DEFAULT_SIMILARITY_THRESHOLD;
    use serde_json::json;

    fn hobbit_results() -> Vec<SourceResult> {
        vec![
            SourceResult::success(
                "Google Books",
                json!({
                    "totalItems": 1,
                    "items": [{
                        "id": "g1",
                        "volumeInfo": {
                            "title": "The Hobbit",
                            "authors": ["J.R.R. Tolkien"],
                            "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9780261102217"}]
                        }
                    }]
                }),
            ),
            SourceResult::success(
                "Open Library",
                json!({
                    "numFound": 1,
                    "docs": [{"key": "/works/OL1W", "title": "The Hobbit", "author_name": ["J. R. R. Tolkien"], "isbn": ["978-0-261-10221-7"]}]
                }),
            ),
            SourceResult::success(
                "LIBRIS (Swedish National Library)",
                json!({"xsearch": {"records": 1, "list": [{"title": "Röda rummet", "creator": "Strindberg, August"}]}}),
            ),
        ]
    }

    #[test]
    fn test_hobbit_end_to_end() {
        let out = deduplicate(hobbit_results(), DEFAULT_SIMILARITY_THRESHOLD);

        assert_eq!(out.clusters.len(), 2);
        assert_eq!(out.clusters[0].canonical().source, "Google Books");
        assert_eq!(out.removed_duplicates(), 1);

        let google = out.results[0].results.as_ref().unwrap();
        assert_eq!(google["items"].as_array().unwrap().len(), 1);
        assert_eq!(google["items"][0]["id"], "g1");
        assert_eq!(google["deduplication"]["removed_duplicates"], 0);

        let open_library = out.results[1].results.as_ref().unwrap();
        assert!(open_library["docs"].as_array().unwrap().is_empty());
        assert_eq!(
            open_library["deduplication"],
            json!({"original_count": 1, "deduplicated_count": 0, "removed_duplicates": 1})
        );
        assert_eq!(open_library["numFound"], 1);

        let libris = out.results[2].results.as_ref().unwrap();
        assert_eq!(libris["xsearch"]["list"].as_array().unwrap().len(), 1);
        assert_eq!(libris["deduplication"]["deduplicated_count"], 1);
    }

    #[test]
    fn test_failed_source_passes_through() {
        let mut input = hobbit_results();
        input[1] = SourceResult::failure("Open Library", "HTTP 503: Service Unavailable");

        let out = deduplicate(input, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(out.results[1], SourceResult::failure("Open Library", "HTTP 503: Service Unavailable"));
        assert_eq!(out.removed_duplicates(), 0);
        assert_eq!(out.results.len(), 3);
    }

    #[test]
    fn test_unrecognized_shape_passes_through() {
        let payload = json!({"message": "no results"});
        let out = deduplicate(vec![SourceResult::success("Google Books", payload.clone())], 0.8);
        assert_eq!(out.results[0].results, Some(payload));
        assert!(out.clusters.is_empty());
    }

    #[test]
    fn test_unnormalizable_items_are_dropped() {
        let payload = json!({"docs": [{"title": "Dune"}, {"key": "/works/OL2W"}]});
        let out = deduplicate(vec![SourceResult::success("Open Library", payload)], 0.8);

        let docs = &out.results[0].results.as_ref().unwrap()["docs"];
        assert_eq!(docs.as_array().unwrap().len(), 1);
        assert_eq!(out.results[0].results.as_ref().unwrap()["deduplication"]["removed_duplicates"], 1);
    }

    #[test]
    fn test_top_level_libris_list() {
        let payload = json!({"list": [{"title": "Dune", "isbn": "1"}, {"title": "Dune", "isbn": "1"}]});
        let out = deduplicate(vec![SourceResult::success("LIBRIS (Swedish National Library)", payload)], 0.8);

        let payload = out.results[0].results.as_ref().unwrap();
        assert_eq!(payload["list"].as_array().unwrap().len(), 1);
        assert_eq!(payload["deduplication"]["original_count"], 2);
    }

    #[test]
    fn test_non_book_source_is_untouched() {
        let payload = json!({"results": [{"title": "Dune"}]});
        let out = deduplicate(vec![SourceResult::success("OpenAlex", payload.clone())], 0.8);
        assert_eq!(out.results[0].results, Some(payload));
    }
}
