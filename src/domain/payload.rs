use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::article::lenient;
use crate::domain::{Article, ImageArticle};

/// Most-read list. Entries that are not JSON objects are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MostRead {
    #[serde(default, deserialize_with = "article_list")]
    pub articles: Vec<Article>,
}

fn article_list<'de, D>(deserializer: D) -> Result<Vec<Article>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values,
        _ => return Ok(Vec::new()),
    };
    Ok(values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

/// Body of the featured-content endpoint for one language and date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContentPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tfa: Option<Article>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageArticle>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mostread: Option<MostRead>,
}

impl RawContentPayload {
    /// Only a JSON object is a payload; derived deserializers would also
    /// take an array as a field sequence.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if !value.is_object() {
            return Err(serde_json::Error::custom("featured content must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn most_read(&self) -> &[Article] {
        self.mostread
            .as_ref()
            .map(|m| m.articles.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let payload = RawContentPayload::from_value(json!({
            "tfa": { "tid": "tfa-1", "titles": { "normalized": "Featured" } },
            "image": { "title": "File:A.jpg" },
            "mostread": { "date": "2024-08-31Z", "articles": [ { "tid": "m1" }, { "tid": "m2" } ] },
            "news": []
        }))
        .unwrap();

        assert_eq!(payload.tfa.as_ref().unwrap().display_title(), "Featured");
        assert_eq!(payload.image.as_ref().unwrap().display_title(), "File:A.jpg");
        assert_eq!(payload.most_read().len(), 2);
    }

    #[test]
    fn test_missing_sections() {
        let payload = RawContentPayload::from_value(json!({})).unwrap();

        assert!(payload.tfa.is_none());
        assert!(payload.image.is_none());
        assert!(payload.most_read().is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let payload = RawContentPayload::from_value(json!({
            "mostread": { "articles": [ { "tid": "ok" }, "junk", 7, { "tid": "ok2" } ] }
        }))
        .unwrap();

        let tids: Vec<_> = payload
            .most_read()
            .iter()
            .map(|a| a.tid.as_deref().unwrap())
            .collect();
        assert_eq!(tids, vec!["ok", "ok2"]);
    }

    #[test]
    fn test_articles_not_a_list() {
        let payload =
            RawContentPayload::from_value(json!({ "mostread": { "articles": "nope" } })).unwrap();
        assert!(payload.most_read().is_empty());
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(RawContentPayload::from_value(json!("<html>")).is_err());
        assert!(RawContentPayload::from_value(json!([1, 2])).is_err());
        assert!(RawContentPayload::from_value(json!([])).is_err());
        assert!(RawContentPayload::from_value(json!(null)).is_err());
    }
}
