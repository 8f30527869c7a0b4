use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use url::Url;

use crate::app::{Result, WikidashError};
use crate::config::ApiConfig;
use crate::domain::language::{is_valid_language_code, is_valid_translation_code};
use crate::normalizer::{Normalizer, Reply};
use crate::transport::Transport;

/// Builds provider requests and hands the outcomes to the [`Normalizer`].
///
/// One attempt per call: no caching and no retry. `Err` is only returned for
/// local problems such as an invalid language code; remote failures come back
/// as a normal [`Reply`] carrying the failing status.
pub struct ContentService {
    transport: Arc<dyn Transport + Send + Sync>,
    normalizer: Normalizer,
    content_base: Url,
    translate_base: Url,
}

impl ContentService {
    pub fn new(transport: Arc<dyn Transport + Send + Sync>, api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            transport,
            normalizer: Normalizer::new(),
            content_base: parse_base(&api.content_base_url)?,
            translate_base: parse_base(&api.translate_base_url)?,
        })
    }

    /// `GET {base}/feed/v1/wikipedia/{language}/featured/{YYYY}/{MM}/{DD}`
    pub async fn fetch_featured_content(&self, language: &str, date: NaiveDate) -> Result<Reply> {
        if !is_valid_language_code(language) {
            return Err(WikidashError::InvalidLanguage(language.to_string()));
        }

        let year = date.format("%Y").to_string();
        let month = date.format("%m").to_string();
        let day = date.format("%d").to_string();
        let url = endpoint(
            &self.content_base,
            &[
                "feed",
                "v1",
                "wikipedia",
                language,
                "featured",
                year.as_str(),
                month.as_str(),
                day.as_str(),
            ],
        )?;

        tracing::debug!(%url, "fetching featured content");
        let outcome = self.transport.get(url.as_str()).await;
        Ok(self.normalizer.normalize(outcome))
    }

    /// `GET {base}/languages` on the translation provider.
    pub async fn fetch_supported_languages(&self) -> Result<Reply> {
        let url = endpoint(&self.translate_base, &["languages"])?;

        tracing::debug!(%url, "fetching translation languages");
        let outcome = self.transport.get(url.as_str()).await;
        Ok(self.normalizer.normalize(outcome))
    }

    /// `POST {base}/translate` with `{ q, source: "auto", target }`.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<Reply> {
        if !is_valid_translation_code(target_language) {
            return Err(WikidashError::InvalidLanguage(target_language.to_string()));
        }

        let url = endpoint(&self.translate_base, &["translate"])?;
        let body = json!({
            "q": text,
            "source": "auto",
            "target": target_language,
        });

        tracing::debug!(%url, target = target_language, "translating");
        let outcome = self.transport.post(url.as_str(), &body).await;
        Ok(self.normalizer.normalize(outcome))
    }
}

/// `translatedText` of a translate reply.
pub fn translated_text(data: &Value) -> Option<&str> {
    data.get("translatedText").and_then(Value::as_str)
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(WikidashError::Config(format!(
            "base URL cannot hold a path: {}",
            raw
        )));
    }
    Ok(url)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| WikidashError::Config(format!("base URL cannot hold a path: {}", base)))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}
