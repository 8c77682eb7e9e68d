use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::errors::TvError;

/// Fixed set of channel categories. Anything else in the data is kept
/// verbatim so it can still be shown and filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Terrestrial,
    Astro,
    Sukan,
    Berita,
    Hiburan,
    Islamik,
    Other(String),
}

const ALL_CATEGORIES: &[Category] = &[
    Category::Terrestrial,
    Category::Astro,
    Category::Sukan,
    Category::Berita,
    Category::Hiburan,
    Category::Islamik,
];

impl Category {
    pub fn all() -> &'static [Category] {
        ALL_CATEGORIES
    }

    /// Value used in the data file and in `data-category` attributes
    pub fn as_str(&self) -> &str {
        match self {
            Category::Terrestrial => "terrestrial",
            Category::Astro => "astro",
            Category::Sukan => "sukan",
            Category::Berita => "berita",
            Category::Hiburan => "hiburan",
            Category::Islamik => "islamik",
            Category::Other(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Category::Terrestrial => "TV Terrestrial",
            Category::Astro => "Astro",
            Category::Sukan => "Sukan",
            Category::Berita => "Berita",
            Category::Hiburan => "Hiburan",
            Category::Islamik => "Islamik",
            Category::Other(raw) => raw,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "terrestrial" => Category::Terrestrial,
            "astro" => Category::Astro,
            "sukan" => Category::Sukan,
            "berita" => Category::Berita,
            "hiburan" => Category::Hiburan,
            "islamik" => Category::Islamik,
            _ => Category::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StreamEntry {
    #[serde(default)]
    pub label: Option<String>,
    pub url: String,
}

/// Display fields simulated at load time in place of a real status feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStatus {
    pub is_live: bool,
    pub viewers: u32,
    pub current_program: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub language: String,
    #[serde(rename = "type", default)]
    pub channel_type: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub streams: Vec<StreamEntry>,

    // Derived after load, never read from the data file
    #[serde(skip)]
    pub status: LiveStatus,
}

impl Channel {
    pub fn is_live(&self) -> bool {
        self.status.is_live
    }

    pub fn first_stream_url(&self) -> Option<&str> {
        self.streams.first().map(|s| s.url.as_str())
    }
}

/// Anything that can hand back the raw channel list.
pub trait ChannelSource {
    fn fetch_channels(&self) -> impl Future<Output = Result<Vec<Channel>, TvError>>;
}

/// Absolute address of the channel list. A relative `data_url` is joined
/// onto `base` (the page address in the browser) and rejected without one.
pub fn resolve_data_url(data_url: &str, base: Option<&str>) -> Result<Url, TvError> {
    let invalid = |e: &dyn std::fmt::Display| {
        TvError::Config(format!("invalid data_url {:?}: {}", data_url, e))
    };
    match base {
        Some(base) => {
            let base = Url::parse(base).map_err(|e| invalid(&e))?;
            base.join(data_url).map_err(|e| invalid(&e))
        }
        None => Url::parse(data_url).map_err(|e| invalid(&e)),
    }
}

#[derive(Debug, Clone)]
pub struct ChannelClient {
    pub data_url: Url,
    client: reqwest::Client,
}

impl ChannelClient {
    pub fn new(data_url: Url) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder()
            .user_agent(concat!("tv-malaysia/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        #[cfg(target_arch = "wasm32")]
        let client = reqwest::Client::new();

        Self { data_url, client }
    }

    /// Client for a configured `data_url`, resolved against `base`.
    pub fn from_config(data_url: &str, base: Option<&str>) -> Result<Self, TvError> {
        Ok(Self::new(resolve_data_url(data_url, base)?))
    }
}

impl ChannelSource for ChannelClient {
    async fn fetch_channels(&self) -> Result<Vec<Channel>, TvError> {
        let resp = self
            .client
            .get(self.data_url.clone())
            .header("Cache-Control", "no-store")
            .header("Pragma", "no-cache")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TvError::ServerError(status.as_u16()));
        }

        let body = resp.text().await?;
        let channels: Vec<Channel> = serde_json::from_str(&body)?;
        Ok(channels)
    }
}
