//! Daily English sentence from dict.eudic.net.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::SourceAdapter;

use crate::extract::{attr, element_text, enclosing_tag, section};
use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct English {
    pub img_url: String,
    pub sentence: String,
}

impl IntoRecord for English {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("ImgURL", self.img_url)
            .field("Sentence", self.sentence)
            .build()
    }
}

pub struct EnglishSource {
    http: HttpFetcher,
    url: String,
}

impl EnglishSource {
    pub const NAME: &'static str = "english";
    pub const URL: &'static str = "http://dict.eudic.net/home/dailysentence";

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
impl SourceAdapter for EnglishSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self) -> Result<Record> {
        let html = self.http.get_text(Self::NAME, &self.url).await?;
        Ok(parse(&html)?.into_record(Self::NAME))
    }
}

pub fn parse(html: &str) -> Result<English> {
    let wrap = section(html, r#"id="getLang"#)
        .and_then(|s| enclosing_tag(s, r#"class="head-img"#))
        .ok_or_else(|| MorningPostError::fetch(EnglishSource::NAME, "no daily sentence block"))?;

    let img_url = enclosing_tag(wrap, r#"class="himg"#)
        .and_then(|scope| attr(scope, "img", "src"))
        .unwrap_or_default();
    let sentence = enclosing_tag(wrap, r#"class="sect_en"#)
        .and_then(|scope| element_text(scope, "p").or_else(|| element_text(scope, "div")))
        .unwrap_or_default();

    Ok(English { img_url, sentence })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <div id="getLang">
      <div class="head-img">
        <img class="himg" src="https://static.frdic.com/daily/1019.jpg">
        <div class="sentence">
          <p class="sect_en">Every day is a fresh start.</p>
          <p class="sect-trans">每一天都是新的开始。</p>
        </div>
      </div>
    </div>"#;

    #[test]
    fn test_parse_sentence() {
        let english = parse(PAGE).unwrap();
        assert_eq!(english.img_url, "https://static.frdic.com/daily/1019.jpg");
        assert_eq!(english.sentence, "Every day is a fresh start.");
    }

    #[test]
    fn test_missing_block_is_error() {
        assert!(parse(r#"<div id="getLang"></div>"#).is_err());
    }

    #[test]
    fn test_record_fields() {
        let record = parse(PAGE).unwrap().into_record(EnglishSource::NAME);
        assert_eq!(record.len(), 2);
        assert!(record.get("ImgURL").is_some());
    }
}
