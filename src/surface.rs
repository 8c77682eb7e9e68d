//! The page the app draws into.
//!
//! [`PageSurface`] covers the directory itself, [`PlayerSurface`] the player
//! modal. The browser build implements both over the DOM; [`HeadlessSurface`]
//! keeps the same state in plain fields for native hosts and tests.

use crate::errors::PageRegion;
use crate::render::{HeroStats, RenderedGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamButton {
    pub label: String,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshControl {
    #[default]
    Ready,
    /// Greyed out while a stream is still loading
    Disabled,
    /// Greyed out with the "Refreshing..." label
    Busy,
}

/// Text shown in the player modal header and info block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalInfo {
    pub name: String,
    pub category: String,
    pub now_playing: String,
    pub description: String,
    pub language: String,
    pub quality: String,
    pub kind: String,
}

pub trait PageSurface {
    fn has_region(&self, region: PageRegion) -> bool;
    fn show_grid(&mut self, grid: &RenderedGrid);
    fn show_error_panel(&mut self, html: &str);
    fn set_hero_stats(&mut self, stats: HeroStats);
    fn set_category_options(&mut self, options: &[(String, String)]);
    fn set_category_value(&mut self, value: &str);
    fn set_status_value(&mut self, value: &str);
    fn set_search_text(&mut self, text: &str);
    fn set_filters_open(&mut self, open: bool);
    fn set_contact_button_hidden(&mut self, hidden: bool);
}

pub trait PlayerSurface {
    /// Whether the modal and its frame container exist.
    fn player_available(&self) -> bool;
    fn show_modal(&mut self, info: &ModalInfo);
    fn hide_modal(&mut self);
    fn update_info(&mut self, info: &ModalInfo);
    fn set_stream_buttons(&mut self, buttons: &[StreamButton]);
    fn show_no_stream_placeholder(&mut self, html: &str);
    fn mount_frame(&mut self, id: FrameId, src: &str);
    /// Remove the frame from the page entirely so playback stops.
    fn detach_frame(&mut self, id: FrameId);
    fn dim_frame(&mut self, id: FrameId, dimmed: bool);
    fn set_loader_visible(&mut self, visible: bool);
    fn set_refresh_control(&mut self, state: RefreshControl);
    fn set_page_scroll_locked(&mut self, locked: bool);
    /// Open `url` in a new browsing context.
    fn open_external(&mut self, url: &str);
    fn load_ad_banner(&mut self);
}

pub trait Surface: PageSurface + PlayerSurface {}

impl<T: PageSurface + PlayerSurface> Surface for T {}

/// In-memory page. Every call leaves a trace that can be inspected.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub has_cards: bool,
    pub has_player: bool,

    pub grid: Option<RenderedGrid>,
    pub grid_renders: usize,
    pub error_panel: Option<String>,
    pub hero: HeroStats,
    pub category_options: Vec<(String, String)>,
    pub category_value: String,
    pub status_value: String,
    pub search_text: String,
    pub filters_open: bool,
    pub contact_button_hidden: bool,

    pub modal_open: bool,
    pub modal_info: Option<ModalInfo>,
    pub stream_buttons: Vec<StreamButton>,
    pub placeholder: Option<String>,
    /// Frames currently attached, oldest first
    pub frames: Vec<(FrameId, String)>,
    /// Every src ever mounted
    pub mounted: Vec<String>,
    pub detached: Vec<FrameId>,
    pub dimmed: Option<FrameId>,
    pub loader_visible: bool,
    pub refresh_control: RefreshControl,
    pub scroll_locked: bool,
    pub external_opens: Vec<String>,
    pub ad_loads: usize,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            has_cards: true,
            has_player: true,
            grid: None,
            grid_renders: 0,
            error_panel: None,
            hero: HeroStats::default(),
            category_options: Vec::new(),
            category_value: "all".to_string(),
            status_value: "all".to_string(),
            search_text: String::new(),
            filters_open: false,
            contact_button_hidden: false,
            modal_open: false,
            modal_info: None,
            stream_buttons: Vec::new(),
            placeholder: None,
            frames: Vec::new(),
            mounted: Vec::new(),
            detached: Vec::new(),
            dimmed: None,
            loader_visible: false,
            refresh_control: RefreshControl::Ready,
            scroll_locked: false,
            external_opens: Vec::new(),
            ad_loads: 0,
        }
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_player() -> Self {
        Self {
            has_player: false,
            ..Self::default()
        }
    }

    pub fn without_cards() -> Self {
        Self {
            has_cards: false,
            ..Self::default()
        }
    }

    pub fn active_buttons(&self) -> Vec<&StreamButton> {
        self.stream_buttons.iter().filter(|b| b.active).collect()
    }

    pub fn current_frame(&self) -> Option<&(FrameId, String)> {
        self.frames.last()
    }
}

impl PageSurface for HeadlessSurface {
    fn has_region(&self, region: PageRegion) -> bool {
        match region {
            PageRegion::Cards => self.has_cards,
            PageRegion::PlayerModal => self.has_player,
        }
    }

    fn show_grid(&mut self, grid: &RenderedGrid) {
        self.grid = Some(grid.clone());
        self.grid_renders += 1;
        self.error_panel = None;
    }

    fn show_error_panel(&mut self, html: &str) {
        self.grid = None;
        self.error_panel = Some(html.to_string());
    }

    fn set_hero_stats(&mut self, stats: HeroStats) {
        self.hero = stats;
    }

    fn set_category_options(&mut self, options: &[(String, String)]) {
        self.category_options = options.to_vec();
    }

    fn set_category_value(&mut self, value: &str) {
        self.category_value = value.to_string();
    }

    fn set_status_value(&mut self, value: &str) {
        self.status_value = value.to_string();
    }

    fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    fn set_filters_open(&mut self, open: bool) {
        self.filters_open = open;
    }

    fn set_contact_button_hidden(&mut self, hidden: bool) {
        self.contact_button_hidden = hidden;
    }
}

impl PlayerSurface for HeadlessSurface {
    fn player_available(&self) -> bool {
        self.has_player
    }

    fn show_modal(&mut self, info: &ModalInfo) {
        self.modal_open = true;
        self.modal_info = Some(info.clone());
        self.placeholder = None;
        self.stream_buttons.clear();
    }

    fn hide_modal(&mut self) {
        self.modal_open = false;
    }

    fn update_info(&mut self, info: &ModalInfo) {
        self.modal_info = Some(info.clone());
    }

    fn set_stream_buttons(&mut self, buttons: &[StreamButton]) {
        self.stream_buttons = buttons.to_vec();
    }

    fn show_no_stream_placeholder(&mut self, html: &str) {
        self.placeholder = Some(html.to_string());
    }

    fn mount_frame(&mut self, id: FrameId, src: &str) {
        self.frames.push((id, src.to_string()));
        self.mounted.push(src.to_string());
    }

    fn detach_frame(&mut self, id: FrameId) {
        self.frames.retain(|(f, _)| *f != id);
        self.detached.push(id);
        if self.dimmed == Some(id) {
            self.dimmed = None;
        }
    }

    fn dim_frame(&mut self, id: FrameId, dimmed: bool) {
        self.dimmed = if dimmed { Some(id) } else { None };
    }

    fn set_loader_visible(&mut self, visible: bool) {
        self.loader_visible = visible;
    }

    fn set_refresh_control(&mut self, state: RefreshControl) {
        self.refresh_control = state;
    }

    fn set_page_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    fn open_external(&mut self, url: &str) {
        self.external_opens.push(url.to_string());
    }

    fn load_ad_banner(&mut self) {
        self.ad_loads += 1;
    }
}
