use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::Channel;
use crate::render::no_stream_placeholder_html;
use crate::store::ChannelStore;
use crate::surface::{FrameId, ModalInfo, PlayerSurface, RefreshControl, StreamButton};
use crate::timers::{earliest, DelayedTask};

pub const CACHE_BUST_PARAM: &str = "_t";

/// Append the cache-busting parameter to `url`.
pub fn cache_busted(url: &str, token: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, CACHE_BUST_PARAM, token)
}

/// Hands out strictly increasing millisecond tokens so two loads of the
/// same address never share a query string, even within one millisecond.
#[derive(Debug, Clone, Default)]
pub struct CacheBuster {
    last: i64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let token = now.max(self.last + 1);
        self.last = token;
        token
    }

    pub fn apply(&mut self, url: &str) -> String {
        let token = self.next_token();
        cache_busted(url, token)
    }
}

pub fn stream_label(label: Option<&str>, index: usize) -> String {
    match label {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => format!("Stream {}", index + 1),
    }
}

pub fn modal_info(channel: &Channel) -> ModalInfo {
    ModalInfo {
        name: channel.name.clone(),
        category: channel.category.display_name().to_string(),
        now_playing: format!("Sedang Main: {}", channel.status.current_program),
        description: channel.description.clone(),
        language: format!("Bahasa: {}", channel.language),
        quality: format!("Kualiti: {}", channel.quality),
        kind: format!("Jenis: {}", channel.channel_type),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTiming {
    pub frame_load_timeout: Duration,
    pub refresh_cooldown: Duration,
    pub ad_delay: Duration,
}

impl Default for PlayerTiming {
    fn default() -> Self {
        Self {
            frame_load_timeout: Duration::from_secs(5),
            refresh_cooldown: Duration::from_secs(2),
            ad_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
struct OpenSession {
    channel: Arc<Channel>,
    buttons: Vec<StreamButton>,
    active_url: Option<String>,
}

/// The player modal: which channel is open, which stream is playing, and
/// the single embedded frame showing it.
#[derive(Debug)]
pub struct PlayerSession {
    open: Option<OpenSession>,
    frame: Option<FrameId>,
    next_frame: u64,
    loader_visible: bool,
    refresh_busy: bool,
    ad_loaded: bool,
    loader_timeout: DelayedTask<FrameId>,
    refresh_reenable: DelayedTask<()>,
    ad_banner: DelayedTask<()>,
    buster: CacheBuster,
    timing: PlayerTiming,
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new(PlayerTiming::default())
    }
}

impl PlayerSession {
    pub fn new(timing: PlayerTiming) -> Self {
        Self {
            open: None,
            frame: None,
            next_frame: 0,
            loader_visible: false,
            refresh_busy: false,
            ad_loaded: false,
            loader_timeout: DelayedTask::new(),
            refresh_reenable: DelayedTask::new(),
            ad_banner: DelayedTask::new(),
            buster: CacheBuster::new(),
            timing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_channel(&self) -> Option<&Arc<Channel>> {
        self.open.as_ref().map(|s| &s.channel)
    }

    pub fn active_stream_url(&self) -> Option<&str> {
        self.open.as_ref().and_then(|s| s.active_url.as_deref())
    }

    pub fn stream_buttons(&self) -> &[StreamButton] {
        self.open.as_ref().map(|s| s.buttons.as_slice()).unwrap_or(&[])
    }

    pub fn current_frame(&self) -> Option<FrameId> {
        self.frame
    }

    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    pub fn ad_loaded(&self) -> bool {
        self.ad_loaded
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_busy
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([
            self.loader_timeout.deadline(),
            self.refresh_reenable.deadline(),
            self.ad_banner.deadline(),
        ])
    }

    /// Show `channel` in the player, replacing whatever was open.
    pub fn open(&mut self, channel: Arc<Channel>, surface: &mut impl PlayerSurface, now: Duration) {
        self.ad_loaded = false;

        if !surface.player_available() {
            warn!(channel = %channel.name, "player modal not found");
            match channel.first_stream_url() {
                Some(url) => surface.open_external(url),
                None => debug!(channel = %channel.name, "no stream to open externally"),
            }
            return;
        }

        info!(channel = %channel.name, streams = channel.streams.len(), "opening player");
        self.remove_frame(surface);

        surface.show_modal(&modal_info(&channel));
        surface.set_page_scroll_locked(true);
        self.set_loader(surface, true);

        let buttons: Vec<StreamButton> = channel
            .streams
            .iter()
            .enumerate()
            .map(|(i, s)| StreamButton {
                label: stream_label(s.label.as_deref(), i),
                url: s.url.clone(),
                active: false,
            })
            .collect();
        let has_streams = !buttons.is_empty();

        self.open = Some(OpenSession {
            channel,
            buttons,
            active_url: None,
        });

        if has_streams {
            self.select_stream(0, surface, now);
        } else {
            surface.set_stream_buttons(&[]);
            surface.show_no_stream_placeholder(&no_stream_placeholder_html());
            self.set_loader(surface, false);
            if !self.refresh_busy {
                surface.set_refresh_control(RefreshControl::Disabled);
            }
        }

        self.ad_banner.schedule(now, self.timing.ad_delay, ());
    }

    /// Make stream `index` the only active one and play it.
    pub fn select_stream(&mut self, index: usize, surface: &mut impl PlayerSurface, now: Duration) {
        let Some(session) = self.open.as_mut() else {
            return;
        };
        let Some(url) = session.buttons.get(index).map(|b| b.url.clone()) else {
            warn!(index, "no stream button at index");
            return;
        };

        for b in session.buttons.iter_mut() {
            b.active = false;
        }
        session.buttons[index].active = true;
        surface.set_stream_buttons(&session.buttons);

        self.load_stream(&url, surface, now);
    }

    /// Swap the frame for a fresh one pointed at `url`.
    pub fn load_stream(&mut self, url: &str, surface: &mut impl PlayerSurface, now: Duration) {
        if url.is_empty() {
            return;
        }
        let Some(session) = self.open.as_mut() else {
            return;
        };
        session.active_url = Some(url.to_string());

        self.set_loader(surface, true);
        if !self.refresh_busy {
            surface.set_refresh_control(RefreshControl::Disabled);
        }

        self.remove_frame(surface);

        self.next_frame += 1;
        let id = FrameId(self.next_frame);
        let src = self.buster.apply(url);
        debug!(frame = id.0, src = %src, "mounting frame");
        surface.mount_frame(id, &src);
        self.frame = Some(id);

        self.loader_timeout
            .schedule(now, self.timing.frame_load_timeout, id);
    }

    /// The frame reported a completed load.
    pub fn frame_loaded(&mut self, id: FrameId, surface: &mut impl PlayerSurface) {
        if self.frame != Some(id) {
            debug!(frame = id.0, "load signal from a frame that is gone");
            return;
        }
        self.loader_timeout.cancel();
        self.set_loader(surface, false);
        surface.dim_frame(id, false);
        if !self.refresh_busy {
            surface.set_refresh_control(RefreshControl::Ready);
        }
    }

    /// Put the refresh control into its busy state. Returns false when there
    /// is nothing to refresh; the caller only fetches on true.
    pub fn begin_refresh(&mut self, surface: &mut impl PlayerSurface) -> bool {
        if self.open_channel().is_none() || self.active_stream_url().is_none() {
            warn!("no current channel or stream to refresh");
            return false;
        }

        self.refresh_busy = true;
        surface.set_refresh_control(RefreshControl::Busy);
        self.set_loader(surface, true);
        if let Some(frame) = self.frame {
            surface.dim_frame(frame, true);
        }
        true
    }

    /// Finish a refresh. `store` has already been updated with the fetch
    /// outcome; `result` says whether that fetch worked.
    pub fn complete_refresh(
        &mut self,
        store: &ChannelStore,
        result: Result<(), &crate::errors::TvError>,
        surface: &mut impl PlayerSurface,
        now: Duration,
    ) {
        self.refresh_reenable
            .schedule(now, self.timing.refresh_cooldown, ());

        if let Err(e) = result {
            error!(error = %e, "failed to refresh stream");
            self.set_loader(surface, false);
            if let Some(frame) = self.frame {
                surface.dim_frame(frame, false);
            }
            return;
        }

        let Some(session) = self.open.as_mut() else {
            debug!("refresh finished after the player closed");
            return;
        };

        if let Some(updated) = store.get(&session.channel.id) {
            session.channel = updated;
            surface.update_info(&modal_info(&session.channel));
        }

        match session.active_url.clone() {
            Some(url) => {
                self.load_stream(&url, surface, now);
                info!("stream refreshed");
            }
            None => self.set_loader(surface, false),
        }
    }

    /// Tear the session down. The frame is detached, not hidden.
    pub fn close(&mut self, surface: &mut impl PlayerSurface) {
        if let Some(session) = &self.open {
            info!(channel = %session.channel.name, "closing player");
        }
        surface.hide_modal();
        surface.set_page_scroll_locked(false);
        self.remove_frame(surface);
        self.set_loader(surface, false);
        self.loader_timeout.cancel();
        self.ad_banner.cancel();
        self.open = None;
    }

    /// Fire whatever timers are due.
    pub fn tick(&mut self, now: Duration, surface: &mut impl PlayerSurface) {
        if let Some(frame) = self.loader_timeout.poll(now) {
            if self.frame == Some(frame) && self.loader_visible {
                debug!(frame = frame.0, "frame load timed out, hiding loader");
                self.set_loader(surface, false);
                if !self.refresh_busy {
                    surface.set_refresh_control(RefreshControl::Ready);
                }
            }
        }

        if self.ad_banner.poll(now).is_some() && self.open.is_some() && !self.ad_loaded {
            surface.load_ad_banner();
            self.ad_loaded = true;
            debug!("ad banner loaded");
        }

        if self.refresh_reenable.poll(now).is_some() {
            self.refresh_busy = false;
            surface.set_refresh_control(RefreshControl::Ready);
        }
    }

    fn remove_frame(&mut self, surface: &mut impl PlayerSurface) {
        if let Some(old) = self.frame.take() {
            surface.detach_frame(old);
        }
    }

    fn set_loader(&mut self, surface: &mut impl PlayerSurface, visible: bool) {
        self.loader_visible = visible;
        surface.set_loader_visible(visible);
    }
}
