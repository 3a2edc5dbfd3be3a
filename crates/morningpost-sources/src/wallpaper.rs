//! Bing picture of the day.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::SourceAdapter;

use crate::extract::{attr, enclosing_tag};
use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallpaper {
    pub img_url: String,
    pub title: String,
}

impl IntoRecord for Wallpaper {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("ImgURL", self.img_url)
            .field("Title", self.title)
            .build()
    }
}

pub struct WallpaperSource {
    http: HttpFetcher,
    origin: String,
}

impl WallpaperSource {
    pub const NAME: &'static str = "wallpaper";
    pub const ORIGIN: &'static str = "https://www.bing.com";

    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            origin: Self::ORIGIN.into(),
        }
    }

    /// Site root; relative image paths are resolved against it.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').into();
        self
    }
}

#[async_trait]
impl SourceAdapter for WallpaperSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self) -> Result<Record> {
        let url = format!("{}/?mkt=zh-CN", self.origin);
        let html = self.http.get_text(Self::NAME, &url).await?;
        Ok(parse(&html, &self.origin)?.into_record(Self::NAME))
    }
}

pub fn parse(html: &str, origin: &str) -> Result<Wallpaper> {
    let href = enclosing_tag(html, r#"id="bgLink""#)
        .and_then(|scope| {
            let tag = scope.split_once('>').map(|(t, _)| t).unwrap_or(scope);
            let name = tag.trim_start_matches('<').split_whitespace().next()?;
            attr(scope, name, "href")
        })
        .filter(|h| !h.is_empty())
        .ok_or_else(|| MorningPostError::fetch(WallpaperSource::NAME, "no #bgLink on page"))?;

    let img_url = if href.starts_with("http://") || href.starts_with("https://") {
        href
    } else {
        format!("{origin}{href}")
    };

    let title = enclosing_tag(html, r#"id="sh_cp""#)
        .and_then(|scope| attr(scope, "a", "title"))
        .unwrap_or_default();

    Ok(Wallpaper { img_url, title })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
    <div id="bgImgProgLoad"></div>
    <link id="bgLink" rel="preload" href="/th?id=OHR.Autumn_ZH-CN1920x1080.jpg&amp;rf=LaDigue.jpg" as="image" />
    <a id="sh_cp" class="sc_light" title="秋日森林，德国巴伐利亚 (© Getty Images)" href="#"></a>"##;

    #[test]
    fn test_parse_relative_href() {
        let w = parse(PAGE, WallpaperSource::ORIGIN).unwrap();
        assert_eq!(
            w.img_url,
            "https://www.bing.com/th?id=OHR.Autumn_ZH-CN1920x1080.jpg&rf=LaDigue.jpg"
        );
        assert_eq!(w.title, "秋日森林，德国巴伐利亚 (© Getty Images)");
    }

    #[test]
    fn test_absolute_href_kept() {
        let page = r#"<link id="bgLink" href="https://cdn.example.com/a.jpg">"#;
        let w = parse(page, WallpaperSource::ORIGIN).unwrap();
        assert_eq!(w.img_url, "https://cdn.example.com/a.jpg");
        assert_eq!(w.title, "");
    }

    #[test]
    fn test_missing_link_is_error() {
        assert!(parse("<html></html>", WallpaperSource::ORIGIN).is_err());
    }
}
