use html_escape::decode_html_entities;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Accepts any JSON for the field and keeps it only if it has the expected
/// shape. Remote payloads are loosely typed, so a surprising field value
/// should drop that field rather than the whole record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Titles {
    #[serde(default, deserialize_with = "lenient")]
    pub normalized: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageUrls {
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentUrls {
    #[serde(default, deserialize_with = "lenient")]
    pub desktop: Option<PageUrls>,
    #[serde(default, deserialize_with = "lenient")]
    pub mobile: Option<PageUrls>,
}

/// An encyclopedia article summary. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub titles: Option<Titles>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content_urls: Option<ContentUrls>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    pub fn display_title(&self) -> &str {
        self.titles
            .as_ref()
            .and_then(|t| t.normalized.as_deref())
            .or(self.title.as_deref())
            .unwrap_or("(Untitled)")
    }

    pub fn thumbnail_source(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(|t| t.source.as_deref())
    }

    /// Desktop page link, used for "learn more".
    pub fn page_url(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|c| c.desktop.as_ref())
            .and_then(|d| d.page.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescription {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lang: Option<String>,
}

/// The daily featured image from the media repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageArticle {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image: Option<Thumbnail>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<ImageDescription>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub file_page: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageArticle {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    /// Description text with HTML entities decoded.
    pub fn description_text(&self) -> Option<String> {
        self.description
            .as_ref()
            .and_then(|d| d.text.as_deref())
            .map(|t| decode_html_entities(t).into_owned())
    }

    /// Link for "full image": the original file when present, else the thumbnail.
    pub fn full_image_source(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|i| i.source.as_deref())
            .or_else(|| self.thumbnail.as_ref().and_then(|t| t.source.as_deref()))
    }
}
