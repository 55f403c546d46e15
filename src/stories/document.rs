//! Story document format: YAML frontmatter between `---` fences, followed by
//! the markdown body verbatim.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StoryError;

/// File name of the document inside each slug directory.
pub const STORY_FILE: &str = "index.mdx";

/// Renders metadata + body into one frontmatter document.
pub fn compose(metadata: &Value, body: &str) -> Result<String, StoryError> {
    let yaml =
        serde_yaml::to_string(metadata).map_err(|e| StoryError::InvalidDocument(e.to_string()))?;
    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Splits a document into `(metadata, body)`.
///
/// A file without an opening fence parses as "whole file is body" with empty
/// metadata; an opening fence without a closing one, or broken YAML, is a
/// malformed document.
pub fn split(raw: &str) -> Result<(Value, String), StoryError> {
    let Some(rest) = raw.strip_prefix("---\n") else {
        return Ok((empty_metadata(), raw.to_string()));
    };

    let (yaml, body) = if let Some(stripped) = rest.strip_prefix("---\n") {
        ("", stripped)
    } else if let Some(i) = rest.find("\n---\n") {
        (&rest[..i], &rest[i + 5..])
    } else if let Some(yaml) = rest.strip_suffix("\n---") {
        (yaml, "")
    } else if rest == "---" {
        ("", "")
    } else {
        return Err(StoryError::InvalidDocument("unterminated frontmatter fence".to_string()));
    };

    let metadata = parse_frontmatter(yaml)?;
    Ok((metadata, body.to_string()))
}

fn parse_frontmatter(yaml: &str) -> Result<Value, StoryError> {
    if yaml.trim().is_empty() {
        return Ok(empty_metadata());
    }

    let parsed: Value =
        serde_yaml::from_str(yaml).map_err(|e| StoryError::InvalidDocument(e.to_string()))?;
    match parsed {
        Value::Object(_) => Ok(parsed),
        _ => Err(StoryError::InvalidDocument("frontmatter is not a mapping".to_string())),
    }
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Metadata-only view of a story, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub tags: Vec<String>,
}

impl StorySummary {
    /// Applies the listing defaults: title falls back to the slug, author to
    /// "Unknown", everything else to empty.
    pub fn from_metadata(slug: &str, metadata: &Value) -> Self {
        let tags = metadata
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter().filter_map(Value::as_str).map(str::to_string).collect()
            })
            .unwrap_or_default();

        Self {
            slug: slug.to_string(),
            title: meta_str(metadata, "title", slug),
            description: meta_str(metadata, "description", ""),
            author: meta_str(metadata, "author", "Unknown"),
            date: meta_str(metadata, "date", ""),
            tags,
        }
    }
}

fn meta_str(metadata: &Value, key: &str, default: &str) -> String {
    metadata.get(key).and_then(Value::as_str).unwrap_or(default).to_string()
}

/// Parses a story date for sort ordering. Accepts `2024-07-01`,
/// `01 Jul 2024` (the console's display format) and RFC 3339; anything else
/// sorts as the earliest possible date.
pub fn parse_story_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_split_round_trip() {
        let metadata = json!({ "title": "Q3 Report", "tags": ["finance"] });
        let body = "# Hello\n\nSome *markdown*.\n";

        let doc = compose(&metadata, body).unwrap();
        let (parsed_meta, parsed_body) = split(&doc).unwrap();

        assert_eq!(parsed_meta, metadata);
        assert_eq!(parsed_body, body);
    }

    #[test]
    fn test_split_without_fence_is_all_body() {
        let (metadata, body) = split("# Just markdown\n").unwrap();
        assert_eq!(metadata, json!({}));
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn test_split_empty_frontmatter() {
        let (metadata, body) = split("---\n---\nbody").unwrap();
        assert_eq!(metadata, json!({}));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_unterminated_fence_is_invalid() {
        assert!(matches!(split("---\ntitle: x\nno closing"), Err(StoryError::InvalidDocument(_))));
    }

    #[test]
    fn test_split_broken_yaml_is_invalid() {
        assert!(matches!(split("---\n{not yaml\n---\nbody"), Err(StoryError::InvalidDocument(_))));
    }

    #[test]
    fn test_split_scalar_frontmatter_is_invalid() {
        assert!(matches!(split("---\njust a string\n---\nbody"), Err(StoryError::InvalidDocument(_))));
    }

    #[test]
    fn test_summary_defaults() {
        let summary = StorySummary::from_metadata("q3-report", &json!({}));
        assert_eq!(summary.title, "q3-report");
        assert_eq!(summary.description, "");
        assert_eq!(summary.author, "Unknown");
        assert_eq!(summary.date, "");
        assert!(summary.tags.is_empty());
    }

    #[test]
    fn test_summary_reads_metadata() {
        let metadata = json!({
            "title": "Q3 Report",
            "author": "A",
            "date": "2024-07-01",
            "tags": ["finance", "quarterly"],
        });
        let summary = StorySummary::from_metadata("q3-report", &metadata);
        assert_eq!(summary.title, "Q3 Report");
        assert_eq!(summary.author, "A");
        assert_eq!(summary.date, "2024-07-01");
        assert_eq!(summary.tags, vec!["finance", "quarterly"]);
    }

    #[test]
    fn test_parse_story_date_formats() {
        assert!(parse_story_date("2024-07-01").is_some());
        assert!(parse_story_date("01 Jul 2024").is_some());
        assert!(parse_story_date("2024-07-01T12:00:00Z").is_some());
        assert_eq!(parse_story_date("2024-07-01"), parse_story_date("01 Jul 2024"));
        assert!(parse_story_date("").is_none());
        assert!(parse_story_date("next tuesday").is_none());
    }
}
