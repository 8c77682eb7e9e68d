#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

use tv_malaysia_lib::api::{Category, Channel, ChannelSource, LiveStatus, StreamEntry};
use tv_malaysia_lib::app::{App, AsyncAction, FetchPurpose};
use tv_malaysia_lib::config::AppConfig;
use tv_malaysia_lib::errors::TvError;
use tv_malaysia_lib::store::LiveStatusSource;
use tv_malaysia_lib::surface::HeadlessSurface;

// ─── Helpers ───────────────────────────────────────────────────────────────────

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn channel(id: &str, name: &str, category: Category, urls: &[&str]) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("Siaran langsung {}", name),
        category,
        language: "Melayu".to_string(),
        channel_type: "24h".to_string(),
        quality: "HD".to_string(),
        logo: format!("https://img.example/{}.png", id),
        streams: urls
            .iter()
            .map(|u| StreamEntry {
                label: None,
                url: u.to_string(),
            })
            .collect(),
        status: LiveStatus::default(),
    }
}

pub fn sample_channels() -> Vec<Channel> {
    vec![
        channel("tv3", "TV3", Category::Terrestrial, &["https://x/tv3.m3u8"]),
        channel("tv1", "TV1", Category::Terrestrial, &["https://x/a.m3u8"]),
        channel(
            "arena",
            "Astro Arena",
            Category::Sukan,
            &["https://x/arena-hd", "https://x/arena-sd?q=low", "https://x/arena-backup"],
        ),
        channel("awani", "Astro Awani", Category::Berita, &["https://x/awani"]),
        channel("alhijrah", "TV Alhijrah", Category::Islamik, &[]),
    ]
}

/// Marks the listed ids live and numbers the program on every load, so a
/// reload is visible in the "now playing" text.
pub struct ScriptedLive {
    live: HashSet<String>,
    loads: usize,
    first_id: Option<String>,
}

impl ScriptedLive {
    pub fn new(live: &[&str]) -> Self {
        Self {
            live: live.iter().map(|s| s.to_string()).collect(),
            loads: 0,
            first_id: None,
        }
    }
}

impl LiveStatusSource for ScriptedLive {
    fn status_for(&mut self, channel: &Channel) -> LiveStatus {
        // A new load starts each time the first channel comes round again.
        if self.first_id.is_none() || self.first_id.as_deref() == Some(channel.id.as_str()) {
            self.first_id = Some(channel.id.clone());
            self.loads += 1;
        }
        LiveStatus {
            is_live: self.live.contains(&channel.id),
            viewers: 5_000,
            current_program: format!("Program {}", self.loads),
        }
    }
}

pub fn new_app(surface: HeadlessSurface) -> App<HeadlessSurface> {
    App::with_live_source(
        AppConfig::default(),
        surface,
        Box::new(ScriptedLive::new(&["tv1", "arena", "awani"])),
    )
}

/// App started and loaded with `sample_channels()` at t=0.
pub fn loaded_app() -> App<HeadlessSurface> {
    let mut app = new_app(HeadlessSurface::new());
    app.start();
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Initial, Ok(sample_channels())),
        ms(0),
    );
    app
}

pub fn card_ids(app: &App<HeadlessSurface>) -> Vec<String> {
    app.surface
        .grid
        .as_ref()
        .map(|g| g.watch_ids.clone())
        .unwrap_or_default()
}

/// In-memory data source handing back a fixed outcome.
pub struct FakeSource {
    pub result: Result<Vec<Channel>, TvError>,
    pub calls: RefCell<usize>,
}

impl FakeSource {
    pub fn ok(channels: Vec<Channel>) -> Self {
        Self {
            result: Ok(channels),
            calls: RefCell::new(0),
        }
    }

    pub fn failing(err: TvError) -> Self {
        Self {
            result: Err(err),
            calls: RefCell::new(0),
        }
    }
}

impl ChannelSource for FakeSource {
    async fn fetch_channels(&self) -> Result<Vec<Channel>, TvError> {
        *self.calls.borrow_mut() += 1;
        self.result.clone()
    }
}
