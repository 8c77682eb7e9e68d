use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::Channel;
use crate::config::{AppConfig, Preferences};
use crate::errors::{PageRegion, TvError};
use crate::filter::{visible_channels, FilterState};
use crate::player::PlayerSession;
use crate::render::{category_options, error_panel_html, CardRenderer, HeroStats, RenderedGrid};
use crate::store::{ChannelStore, LiveStatusSource, RandomLiveStatus};
use crate::surface::{FrameId, RefreshControl, Surface};
use crate::timers::{earliest, DelayedTask};

/// Something the user did on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A keystroke in the search box; carries the full input value
    SearchInput(String),
    ClearSearch,
    /// New value of the category selector
    CategoryChanged(String),
    /// New value of the status selector
    StatusChanged(String),
    /// A category navigation button, keyed by category value
    CategoryButton(String),
    MenuToggle,
    /// A card's watch control, keyed by channel id
    WatchClicked(String),
    StreamSelected(usize),
    FrameLoaded(FrameId),
    RefreshClicked,
    CloseClicked,
    /// A click that landed on the modal; `on_scrim` is false for clicks on
    /// the modal content
    ModalClicked { on_scrim: bool },
    KeyDown(String),
    RetryClicked,
}

impl UiEvent {
    /// Events whose DOM click must not reach ancestor handlers.
    pub fn stops_propagation(&self) -> bool {
        matches!(self, UiEvent::WatchClicked(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    Initial,
    Refresh,
}

/// Work the host has to carry out on the app's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchChannels(FetchPurpose),
    ReloadPage,
}

/// Results of host work, fed back into the app.
#[derive(Debug, Clone)]
pub enum AsyncAction {
    ChannelsLoaded(FetchPurpose, Result<Vec<Channel>, TvError>),
}

/// All page state, owned in one place and only touched from the event loop.
pub struct App<S> {
    pub config: AppConfig,
    pub store: ChannelStore,
    pub filter: FilterState,
    pub session: PlayerSession,
    pub surface: S,
    pub preferences: Preferences,
    pub filters_open: bool,
    pub initialized: bool,
    pub(crate) search: DelayedTask<String>,
    pub(crate) renderer: CardRenderer,
    pub(crate) live: Box<dyn LiveStatusSource>,
}

impl<S: Surface> App<S> {
    pub fn new(config: AppConfig, surface: S) -> Self {
        Self::with_live_source(config, surface, Box::new(RandomLiveStatus::new()))
    }

    pub fn with_live_source(
        config: AppConfig,
        surface: S,
        live: Box<dyn LiveStatusSource>,
    ) -> Self {
        let session = PlayerSession::new(config.player_timing());
        let renderer = CardRenderer::new(config.placeholder_base_url.clone());
        Self {
            config,
            store: ChannelStore::new(),
            filter: FilterState::new(),
            session,
            surface,
            preferences: Preferences::default(),
            filters_open: false,
            initialized: false,
            search: DelayedTask::new(),
            renderer,
            live,
        }
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Check the page and kick off the first load. `None` means the page is
    /// unusable and nothing more will happen.
    pub fn start(&mut self) -> Option<Effect> {
        info!("TV Malaysia Online initializing");

        if !self.surface.has_region(PageRegion::Cards) {
            error!(error = %TvError::MissingRegion(PageRegion::Cards), "aborting start");
            return None;
        }
        if !self.surface.has_region(PageRegion::PlayerModal) {
            warn!(region = %PageRegion::PlayerModal, "page region missing");
        }

        self.surface
            .set_contact_button_hidden(self.preferences.contact_button_hidden);
        Some(Effect::FetchChannels(FetchPurpose::Initial))
    }

    /// Back to a freshly opened page. Config and preferences are kept;
    /// everything loaded or chosen since is dropped.
    pub fn reset(&mut self) {
        if self.session.is_open() {
            self.session.close(&mut self.surface);
        }
        self.session = PlayerSession::new(self.config.player_timing());
        self.surface.set_refresh_control(RefreshControl::Ready);

        self.search.cancel();
        self.filter = FilterState::new();
        self.surface.set_search_text("");
        self.surface.set_category_value("all");
        self.surface.set_status_value("all");

        self.filters_open = false;
        self.surface.set_filters_open(false);

        self.store.reset();
        self.initialized = false;
        debug!("app state reset");
    }

    /// Earliest moment `tick` has something to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([self.search.deadline(), self.session.next_deadline()])
    }

    pub fn tick(&mut self, now: Duration) {
        if let Some(query) = self.search.poll(now) {
            self.filter.query = query;
            self.apply_filters();
        }
        self.session.tick(now, &mut self.surface);
    }

    /// Recompute the visible set and redraw the grid.
    pub fn apply_filters(&mut self) -> RenderedGrid {
        let visible = visible_channels(self.store.channels(), &self.filter);
        let grid = self.renderer.render(&visible);
        self.surface.show_grid(&grid);
        info!(cards = grid.watch_ids.len(), "rendered channel cards");
        grid
    }

    /// Take any search text still waiting on the debounce so an immediate
    /// recompute sees what is in the box.
    pub(crate) fn flush_pending_search(&mut self) {
        if let Some(query) = self.search.cancel() {
            self.filter.query = query;
        }
    }

    pub(crate) fn refresh_page_stats(&mut self) {
        self.surface.set_hero_stats(HeroStats::from_store(&self.store));
    }

    pub(crate) fn show_load_error(&mut self, err: &TvError) {
        let message = format!("Gagal memuat senarai channel. {}", err.diagnostics());
        self.surface.show_error_panel(&error_panel_html(&message));
        self.refresh_page_stats();
    }

    pub(crate) fn populate_category_filter(&mut self) {
        self.surface.set_category_options(&category_options());
    }
}
