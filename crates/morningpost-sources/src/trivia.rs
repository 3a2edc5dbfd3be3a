//! Random trivia card from lengdou.net. Off by default.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::SourceAdapter;

use crate::extract::{attr, element_text, enclosing_tag};
use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    pub img_url: String,
    pub description: String,
}

impl IntoRecord for Trivia {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("ImgURL", self.img_url)
            .field("Description", self.description)
            .build()
    }
}

pub struct TriviaSource {
    http: HttpFetcher,
    url: String,
}

impl TriviaSource {
    pub const NAME: &'static str = "trivia";
    pub const URL: &'static str = "http://www.lengdou.net/random";

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
impl SourceAdapter for TriviaSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self) -> Result<Record> {
        let html = self.http.get_text(Self::NAME, &self.url).await?;
        Ok(parse(&html)?.into_record(Self::NAME))
    }
}

pub fn parse(html: &str) -> Result<Trivia> {
    let content = enclosing_tag(html, r#"class="topic-content"#)
        .ok_or_else(|| MorningPostError::fetch(TriviaSource::NAME, "no topic-content on page"))?;
    let tag = content
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>')
        .next()
        .unwrap_or("div");
    let description = element_text(content, tag).unwrap_or_default();
    let img_url = enclosing_tag(html, r#"class="topic-img"#)
        .and_then(|scope| attr(scope, "img", "src"))
        .unwrap_or_default();

    Ok(Trivia {
        img_url,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card() {
        let page = r#"
            <div class="topic-img"><img src="http://img.lengdou.net/1.jpg"></div>
            <p class="topic-content">章鱼有三颗心脏。</p>"#;
        let t = parse(page).unwrap();
        assert_eq!(t.img_url, "http://img.lengdou.net/1.jpg");
        assert_eq!(t.description, "章鱼有三颗心脏。");
    }

    #[test]
    fn test_text_only_card() {
        let t = parse(r#"<div class="topic-content">No picture today</div>"#).unwrap();
        assert_eq!(t.img_url, "");
        assert_eq!(t.description, "No picture today");
    }

    #[test]
    fn test_missing_content_is_error() {
        assert!(parse("<div></div>").is_err());
    }
}
