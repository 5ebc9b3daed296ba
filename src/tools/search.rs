//! Search tools: web (Tavily), Wikipedia, and arXiv.
//!
//! Each provider call is a pure formatting pass-through: results come back
//! as [`ExternalDocument`]s and are rendered into `<Document/>` blocks for
//! the model. No ranking, filtering, or deduplication happens here.

use crate::config::SearchSettings;
use crate::error::{Result, SvarError};
use serde::Deserialize;
use tracing::debug;

/// Tavily search API endpoint.
const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// MediaWiki API endpoint for English Wikipedia.
const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// arXiv Atom export API endpoint.
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Separator between rendered document blocks.
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// A single retrieved document, alive only for the duration of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDocument {
    /// Source locator (URL or provider identifier).
    pub source: String,
    /// Human-readable title, when the provider returns one.
    pub title: Option<String>,
    /// Page or locator within the source, when applicable.
    pub page: Option<String>,
    /// Body text.
    pub body: String,
}

/// Render documents as `<Document/>` blocks joined by [`DOCUMENT_SEPARATOR`].
///
/// Zero documents render to the empty string, not an error: the model treats
/// an empty tool result as "no results".
pub fn format_documents(docs: &[ExternalDocument]) -> String {
    docs.iter()
        .map(|doc| {
            let mut attrs = format!("source=\"{}\"", doc.source);
            if let Some(title) = &doc.title {
                attrs.push_str(&format!(" title=\"{}\"", title));
            }
            if let Some(page) = &doc.page {
                attrs.push_str(&format!(" page=\"{}\"", page));
            }
            format!("<Document {}>\n{}\n</Document>", attrs, doc.body)
        })
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

/// Search the web via Tavily and return up to `max_web_results` document blocks.
pub async fn web_search(
    http: &reqwest::Client,
    settings: &SearchSettings,
    query: &str,
) -> Result<String> {
    let api_key = settings.tavily_key().ok_or_else(|| {
        SvarError::Config(
            "TAVILY_API_KEY not set. Set it with: export TAVILY_API_KEY='tvly-...'".to_string(),
        )
    })?;

    let response = http
        .post(TAVILY_API_URL)
        .json(&serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": settings.max_web_results,
        }))
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = response.json().await?;
    let docs = parse_tavily_results(&body, settings.max_web_results);
    debug!("Web search returned {} results", docs.len());

    Ok(format_documents(&docs))
}

/// Extract documents from a Tavily JSON response.
fn parse_tavily_results(data: &serde_json::Value, limit: usize) -> Vec<ExternalDocument> {
    let Some(items) = data["results"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .take(limit)
        .map(|item| {
            // Prefer the short 'content' snippet over the full 'raw_content'
            let body = item["content"]
                .as_str()
                .filter(|s| !s.is_empty())
                .or_else(|| item["raw_content"].as_str())
                .unwrap_or("");

            ExternalDocument {
                source: item["url"].as_str().unwrap_or("").to_string(),
                title: item["title"].as_str().map(|s| s.to_string()),
                page: None,
                body: body.to_string(),
            }
        })
        .collect()
}

/// Search Wikipedia and return up to `max_wiki_results` document blocks.
pub async fn wiki_search(
    http: &reqwest::Client,
    settings: &SearchSettings,
    query: &str,
) -> Result<String> {
    let limit = settings.max_wiki_results.to_string();
    let response = http
        .get(WIKIPEDIA_API_URL)
        .query(&[
            ("action", "query"),
            ("format", "json"),
            ("generator", "search"),
            ("gsrsearch", query),
            ("gsrlimit", limit.as_str()),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("exintro", "1"),
            ("exlimit", "max"),
        ])
        .header("User-Agent", "svar/0.1 (tool-calling assistant)")
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = response.json().await?;
    let docs = parse_wiki_results(&body, settings.max_wiki_results);
    debug!("Wikipedia search returned {} results", docs.len());

    Ok(format_documents(&docs))
}

/// Extract documents from a MediaWiki query response, ordered by search rank.
fn parse_wiki_results(data: &serde_json::Value, limit: usize) -> Vec<ExternalDocument> {
    let Some(pages) = data["query"]["pages"].as_object() else {
        return Vec::new();
    };

    // The pages map is keyed by page id; the search rank lives in "index"
    let mut ranked: Vec<&serde_json::Value> = pages.values().collect();
    ranked.sort_by_key(|page| page["index"].as_i64().unwrap_or(i64::MAX));

    ranked
        .iter()
        .take(limit)
        .filter_map(|page| {
            let title = page["title"].as_str()?;
            let extract = page["extract"].as_str().unwrap_or("");

            Some(ExternalDocument {
                source: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
                title: Some(title.to_string()),
                page: None,
                body: extract.to_string(),
            })
        })
        .collect()
}

/// Search arXiv and return up to `max_arxiv_results` document blocks.
pub async fn arxiv_search(
    http: &reqwest::Client,
    settings: &SearchSettings,
    query: &str,
) -> Result<String> {
    let search_query = format!("all:{}", query);
    let max_results = settings.max_arxiv_results.to_string();
    let response = http
        .get(ARXIV_API_URL)
        .query(&[
            ("search_query", search_query.as_str()),
            ("start", "0"),
            ("max_results", max_results.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let xml = response.text().await?;
    let docs = parse_arxiv_feed(&xml, settings.max_arxiv_results)?;
    debug!("arXiv search returned {} results", docs.len());

    Ok(format_documents(&docs))
}

/// Atom feed as returned by the arXiv export API.
#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    title: String,
    summary: String,
    #[serde(default)]
    published: Option<String>,
}

/// Extract documents from an arXiv Atom feed.
fn parse_arxiv_feed(xml: &str, limit: usize) -> Result<Vec<ExternalDocument>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)
        .map_err(|e| SvarError::Search(format!("Failed to parse arXiv response: {}", e)))?;

    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| ExternalDocument {
            source: entry.id.trim().to_string(),
            title: Some(collapse_whitespace(&entry.title)),
            page: entry.published.map(|p| p.trim().to_string()),
            body: collapse_whitespace(&entry.summary),
        })
        .collect())
}

/// arXiv wraps titles and abstracts across lines; flatten to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str, body: &str) -> ExternalDocument {
        ExternalDocument {
            source: source.to_string(),
            title: None,
            page: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_format_documents_empty() {
        assert_eq!(format_documents(&[]), "");
    }

    #[test]
    fn test_format_documents_blocks() {
        let docs = vec![doc("https://a.example", "first"), doc("https://b.example", "second")];
        let output = format_documents(&docs);

        assert_eq!(output.matches("<Document ").count(), 2);
        assert_eq!(output.matches(DOCUMENT_SEPARATOR).count(), 1);
        assert!(output.contains("source=\"https://a.example\""));
        assert!(output.contains("first"));
        assert!(output.contains("second"));
    }

    #[test]
    fn test_format_documents_optional_attrs() {
        let mut d = doc("https://a.example", "body");
        d.title = Some("A Title".to_string());
        d.page = Some("2024-01-01".to_string());

        let output = format_documents(&[d]);
        assert!(output.contains("title=\"A Title\""));
        assert!(output.contains("page=\"2024-01-01\""));
    }

    #[test]
    fn test_parse_tavily_results() {
        let data = serde_json::json!({
            "results": [
                {"url": "https://example.com/1", "title": "One", "content": "Snippet one"},
                {"url": "https://example.com/2", "title": "Two", "content": "", "raw_content": "Raw two"}
            ]
        });

        let docs = parse_tavily_results(&data, 3);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source, "https://example.com/1");
        assert_eq!(docs[0].body, "Snippet one");
        // Falls back to raw_content when content is empty
        assert_eq!(docs[1].body, "Raw two");
    }

    #[test]
    fn test_parse_tavily_results_empty() {
        let data = serde_json::json!({"results": []});
        assert!(parse_tavily_results(&data, 3).is_empty());

        let data = serde_json::json!({});
        assert!(parse_tavily_results(&data, 3).is_empty());
    }

    #[test]
    fn test_parse_wiki_results_ranked() {
        let data = serde_json::json!({
            "query": {
                "pages": {
                    "200": {"title": "Second Page", "index": 2, "extract": "Second extract"},
                    "100": {"title": "First Page", "index": 1, "extract": "First extract"}
                }
            }
        });

        let docs = parse_wiki_results(&data, 2);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("First Page"));
        assert_eq!(docs[0].source, "https://en.wikipedia.org/wiki/First_Page");
        assert_eq!(docs[1].body, "Second extract");
    }

    #[test]
    fn test_parse_arxiv_feed() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-01T00:00:00Z</published>
    <title>A Paper
      Title</title>
    <summary>An abstract
      spanning lines.</summary>
  </entry>
</feed>"#;

        let docs = parse_arxiv_feed(xml, 2).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "http://arxiv.org/abs/2401.00001v1");
        assert_eq!(docs[0].title.as_deref(), Some("A Paper Title"));
        assert_eq!(docs[0].body, "An abstract spanning lines.");
        assert_eq!(docs[0].page.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_arxiv_feed_malformed() {
        assert!(parse_arxiv_feed("not xml at all <", 2).is_err());
    }
}
