use std::time::Duration;
use tracing::info;

use crate::app::{App, AsyncAction, FetchPurpose};
use crate::surface::Surface;

impl<S: Surface> App<S> {
    pub fn handle_async_action(&mut self, action: AsyncAction, now: Duration) {
        match action {
            AsyncAction::ChannelsLoaded(FetchPurpose::Initial, result) => {
                match self.store.apply(result, self.live.as_mut()) {
                    Ok(()) => {
                        self.refresh_page_stats();
                        self.populate_category_filter();
                        self.apply_filters();
                        info!("TV Malaysia Online ready");
                    }
                    Err(e) => self.show_load_error(&e),
                }
                self.initialized = true;
            }
            AsyncAction::ChannelsLoaded(FetchPurpose::Refresh, result) => {
                let outcome = self.store.apply(result, self.live.as_mut());
                if outcome.is_ok() {
                    self.refresh_page_stats();
                    self.apply_filters();
                }
                self.session.complete_refresh(
                    &self.store,
                    outcome.as_ref().map(|_| ()),
                    &mut self.surface,
                    now,
                );
            }
        }
    }
}
