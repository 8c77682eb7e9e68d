use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::{App, Effect, FetchPurpose, UiEvent};
use crate::filter::{CategoryFilter, StatusFilter};
use crate::surface::Surface;

impl<S: Surface> App<S> {
    /// Dispatch one page event. Returns work the host must perform.
    pub fn handle_event(&mut self, event: UiEvent, now: Duration) -> Option<Effect> {
        match event {
            UiEvent::SearchInput(text) => {
                self.search.schedule(now, self.config.search_debounce(), text);
            }
            UiEvent::ClearSearch => {
                self.search.cancel();
                self.filter.query.clear();
                self.surface.set_search_text("");
                self.apply_filters();
            }
            UiEvent::CategoryChanged(value) => {
                self.flush_pending_search();
                self.filter.category = CategoryFilter::from_value(&value);
                self.apply_filters();
            }
            UiEvent::StatusChanged(value) => {
                self.flush_pending_search();
                self.filter.status = StatusFilter::from_value(&value);
                self.apply_filters();
            }
            UiEvent::CategoryButton(value) => {
                self.flush_pending_search();
                self.filter.category = CategoryFilter::from_value(&value);
                self.surface.set_category_value(&value);
                self.apply_filters();
            }
            UiEvent::MenuToggle => {
                self.filters_open = !self.filters_open;
                self.surface.set_filters_open(self.filters_open);
            }
            UiEvent::WatchClicked(id) => match self.store.get(&id) {
                Some(channel) => {
                    info!(channel = %channel.name, "watch clicked");
                    self.session.open(channel, &mut self.surface, now);
                }
                None => warn!(id = %id, "channel not found"),
            },
            UiEvent::StreamSelected(index) => {
                self.session.select_stream(index, &mut self.surface, now);
            }
            UiEvent::FrameLoaded(frame) => {
                self.session.frame_loaded(frame, &mut self.surface);
            }
            UiEvent::RefreshClicked => {
                if self.session.begin_refresh(&mut self.surface) {
                    return Some(Effect::FetchChannels(FetchPurpose::Refresh));
                }
            }
            UiEvent::CloseClicked => {
                if self.session.is_open() {
                    self.session.close(&mut self.surface);
                }
            }
            UiEvent::ModalClicked { on_scrim } => {
                if on_scrim && self.session.is_open() {
                    self.session.close(&mut self.surface);
                }
            }
            UiEvent::KeyDown(key) => {
                if key == "Escape" && self.session.is_open() {
                    self.session.close(&mut self.surface);
                }
            }
            UiEvent::RetryClicked => {
                debug!("retry requested, reloading page");
                return Some(Effect::ReloadPage);
            }
        }
        None
    }
}
