//! Poem of the day from the jinrishici JSON API.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::SourceAdapter;
use serde::Deserialize;

use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Poem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub dynasty: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: Vec<String>,
    /// Modern translation, one line per element; `null` for many poems.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub translate: Vec<String>,
}

impl IntoRecord for Poem {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("Title", self.title)
            .field("Dynasty", self.dynasty)
            .field("Author", self.author)
            .field("Content", self.content)
            .field("Translate", self.translate)
            .build()
    }
}

#[derive(Debug, Deserialize)]
struct PoemResponse {
    status: String,
    #[serde(default)]
    data: Option<PoemData>,
}

#[derive(Debug, Deserialize)]
struct PoemData {
    origin: Poem,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct PoemSource {
    http: HttpFetcher,
    url: String,
}

impl PoemSource {
    pub const NAME: &'static str = "poem";
    pub const URL: &'static str = "https://v2.jinrishici.com/one.json";

    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            url: Self::URL.into(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl SourceAdapter for PoemSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self) -> Result<Record> {
        let body = self.http.get_text(Self::NAME, &self.url).await?;
        Ok(parse(&body)?.into_record(Self::NAME))
    }
}

/// Decode the API envelope; anything but `"status": "success"` is a failure.
pub fn parse(body: &str) -> Result<Poem> {
    let resp: PoemResponse = serde_json::from_str(body)
        .map_err(|e| MorningPostError::fetch(PoemSource::NAME, format!("decode json: {e}")))?;
    if resp.status != "success" {
        return Err(MorningPostError::fetch(
            PoemSource::NAME,
            format!("status: {}", resp.status),
        ));
    }
    resp.data
        .map(|d| d.origin)
        .ok_or_else(|| MorningPostError::fetch(PoemSource::NAME, "response has no data"))
}
