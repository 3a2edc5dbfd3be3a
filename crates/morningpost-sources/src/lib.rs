//! # MorningPost Sources
//!
//! One adapter per content type. Each owns a typed record and its explicit
//! field table (`IntoRecord`), so templates reference `{{poem.Title}}`,
//! `{{weather.Temp}}` and so on.
//!
//! | name        | fields                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `one`       | Date, ImgURL, Sentence                                    |
//! | `english`   | ImgURL, Sentence                                          |
//! | `poem`      | Title, Dynasty, Author, Content, Translate                |
//! | `wallpaper` | ImgURL, Title                                             |
//! | `trivia`    | ImgURL, Description                                       |
//! | `weather`   | City, Temp, Weather, Air, Humidity, Wind, Limit, Note     |

pub mod english;
pub mod extract;
pub mod http;
pub mod one;
pub mod poem;
pub mod trivia;
pub mod wallpaper;
pub mod weather;

use std::sync::Arc;

use morningpost_core::config::SourcesConfig;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::traits::{SourceAdapter, WeatherSource};

pub use english::EnglishSource;
pub use http::HttpFetcher;
pub use one::OneSource;
pub use poem::PoemSource;
pub use trivia::TriviaSource;
pub use wallpaper::WallpaperSource;
pub use weather::MojiWeather;

/// Names accepted in `sources.enabled`.
pub const AVAILABLE: &[&str] = &[
    OneSource::NAME,
    EnglishSource::NAME,
    PoemSource::NAME,
    WallpaperSource::NAME,
    TriviaSource::NAME,
];

/// Build the shared (non-weather) adapters listed in `sources.enabled`.
pub fn build_sources(config: &SourcesConfig, http: &HttpFetcher) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let mut sources: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(config.enabled.len());
    for name in &config.enabled {
        let adapter: Arc<dyn SourceAdapter> = match name.trim() {
            OneSource::NAME => Arc::new(OneSource::new(http.clone())),
            EnglishSource::NAME => Arc::new(EnglishSource::new(http.clone())),
            PoemSource::NAME => Arc::new(PoemSource::new(http.clone())),
            WallpaperSource::NAME => Arc::new(WallpaperSource::new(http.clone())),
            TriviaSource::NAME => Arc::new(TriviaSource::new(http.clone())),
            other => {
                return Err(MorningPostError::Config(format!(
                    "unknown source '{other}' (available: {})",
                    AVAILABLE.join(", ")
                )));
            }
        };
        if sources.iter().any(|s| s.name() == adapter.name()) {
            tracing::warn!("⚠️ Source '{}' listed twice, ignoring duplicate", adapter.name());
            continue;
        }
        sources.push(adapter);
    }
    tracing::debug!("Enabled sources: {}", config.enabled.join(", "));
    Ok(sources)
}

pub fn weather_source(http: &HttpFetcher) -> Arc<dyn WeatherSource> {
    Arc::new(MojiWeather::new(http.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_sources() {
        let config = SourcesConfig::default();
        let http = HttpFetcher::from_config(&config).unwrap();
        let sources = build_sources(&config, &http).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["one", "english", "poem", "wallpaper"]);
    }

    #[test]
    fn test_unknown_source_rejected() {
        let config = SourcesConfig {
            enabled: vec!["horoscope".into()],
            ..SourcesConfig::default()
        };
        let http = HttpFetcher::from_config(&config).unwrap();
        let err = build_sources(&config, &http).err().unwrap();
        assert!(err.to_string().contains("horoscope"));
    }

    #[test]
    fn test_duplicates_dropped() {
        let config = SourcesConfig {
            enabled: vec!["trivia".into(), "trivia".into()],
            ..SourcesConfig::default()
        };
        let http = HttpFetcher::from_config(&config).unwrap();
        assert_eq!(build_sources(&config, &http).unwrap().len(), 1);
    }
}
