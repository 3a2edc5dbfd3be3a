//! "One" — headline picture and sentence from the vgtime front page.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::SourceAdapter;

use crate::extract::{attr, element_text, enclosing_tag, section, text_after_first_child};
use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct One {
    pub date: String,
    pub img_url: String,
    pub sentence: String,
}

impl IntoRecord for One {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("Date", self.date)
            .field("ImgURL", self.img_url)
            .field("Sentence", self.sentence)
            .build()
    }
}

pub struct OneSource {
    http: HttpFetcher,
    url: String,
}

impl OneSource {
    pub const NAME: &'static str = "one";
    pub const URL: &'static str = "http://www.vgtime.com/";

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
impl SourceAdapter for OneSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self) -> Result<Record> {
        let html = self.http.get_text(Self::NAME, &self.url).await?;
        Ok(parse(&html)?.into_record(Self::NAME))
    }
}

/// First item of the focus list: the image title doubles as the sentence,
/// falling back to the headline when the image has none.
pub fn parse(html: &str) -> Result<One> {
    let item = section(html, r#"class="foc_list"#)
        .and_then(|list| section(list, "<li"))
        .ok_or_else(|| MorningPostError::fetch(OneSource::NAME, "no foc_list item on page"))?;

    let img_box = enclosing_tag(item, r#"class="img_box"#);
    let sentence = img_box
        .and_then(|scope| attr(scope, "a", "title"))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            enclosing_tag(item, r#"class="info_box"#).and_then(|scope| element_text(scope, "h2"))
        })
        .unwrap_or_default();
    let img_url = img_box
        .and_then(|scope| attr(scope, "img", "src"))
        .unwrap_or_default();
    let date = enclosing_tag(item, r#"class="time_box"#)
        .and_then(text_after_first_child)
        .unwrap_or_default();

    Ok(One {
        date,
        img_url,
        sentence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <div class="foc_list"><ul>
      <li>
        <div class="img_box"><a href="/topic/1.jhtml" title="晨光里的第一句话"><img src="https://img.vgtime.com/a.jpg" alt=""></a></div>
        <div class="info_box">
          <a href="/topic/1.jhtml"><h2>头条标题</h2></a>
          <div class="fot_box"><div class="time_box"><i class="icon_time"></i>2026-10-19</div></div>
        </div>
      </li>
      <li><div class="img_box"><a title="second"><img src="b.jpg"></a></div></li>
    </ul></div>"#;

    #[test]
    fn test_parse_first_item() {
        let one = parse(PAGE).unwrap();
        assert_eq!(one.sentence, "晨光里的第一句话");
        assert_eq!(one.img_url, "https://img.vgtime.com/a.jpg");
        assert_eq!(one.date, "2026-10-19");
    }

    #[test]
    fn test_sentence_falls_back_to_headline() {
        let page = PAGE.replace(r#" title="晨光里的第一句话""#, "");
        let one = parse(&page).unwrap();
        assert_eq!(one.sentence, "头条标题");
    }

    #[test]
    fn test_missing_list_is_error() {
        assert!(parse("<html></html>").is_err());
    }
}
