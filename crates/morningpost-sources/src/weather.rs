//! Weather — per-recipient report from tianqi.moji.com.

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::record::{IntoRecord, Record};
use morningpost_core::traits::WeatherSource;
use morningpost_core::WEATHER_KEY;

use crate::extract::{element_text, enclosing_tag, section};
use crate::http::HttpFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Weather {
    pub city: String,
    pub temp: String,
    pub weather: String,
    pub air: String,
    pub humidity: String,
    pub wind: String,
    /// Traffic restriction note, if the city has one today.
    pub limit: String,
    pub note: String,
}

impl IntoRecord for Weather {
    fn into_record(self, source: &str) -> Record {
        Record::builder(source)
            .field("City", self.city)
            .field("Temp", self.temp)
            .field("Weather", self.weather)
            .field("Air", self.air)
            .field("Humidity", self.humidity)
            .field("Wind", self.wind)
            .field("Limit", self.limit)
            .field("Note", self.note)
            .build()
    }
}

pub struct MojiWeather {
    http: HttpFetcher,
    base_url: String,
}

impl MojiWeather {
    pub const BASE_URL: &'static str = "https://tianqi.moji.com/weather/china/";

    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            base_url: Self::BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherSource for MojiWeather {
    async fn fetch_for(&self, local: &str) -> Result<Record> {
        let url = format!("{}{}", self.base_url, local.trim_start_matches('/'));
        let html = self.http.get_text(WEATHER_KEY, &url).await?;
        let weather = parse(&html)?;
        tracing::debug!("🌤️ Weather for {local}: {} {}", weather.city, weather.temp);
        Ok(weather.into_record(WEATHER_KEY))
    }
}

/// Parse a moji weather page. Missing pieces become empty strings; a page
/// without the weather block at all is an error.
pub fn parse(html: &str) -> Result<Weather> {
    let wrap = section(html, r#"class="wea_info"#)
        .ok_or_else(|| MorningPostError::fetch(WEATHER_KEY, "no wea_info block on page"))?;

    let block = |class: &str| enclosing_tag(wrap, &format!(r#"class="{class}"#));
    let text_in = |class: &str, tag: &str| {
        block(class)
            .and_then(|scope| element_text(scope, tag))
            .unwrap_or_default()
    };

    let city = enclosing_tag(html, r#"class="search_default"#)
        .and_then(|scope| element_text(scope, "em"))
        .unwrap_or_default();

    // The air quality value sits in the element right after `.level`.
    let air = block("wea_alert")
        .and_then(|scope| section(scope, r#"class="level"#))
        .and_then(|scope| element_text(scope, "em"))
        .unwrap_or_default();

    Ok(Weather {
        city,
        temp: text_in("wea_weather", "em"),
        weather: text_in("wea_weather", "b"),
        air,
        humidity: text_in("wea_about", "span"),
        wind: text_in("wea_about", "em"),
        limit: restriction(&text_in("wea_about", "b")),
        note: text_in("wea_tips", "em"),
    })
}

/// Drop the four-character label ("尾号限行") in front of the plate numbers.
fn restriction(desc: &str) -> String {
    let chars: Vec<char> = desc.chars().collect();
    if chars.len() <= 4 {
        desc.to_string()
    } else {
        chars[4..].iter().collect::<String>().trim().to_string()
    }
}
