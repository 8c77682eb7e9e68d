//! Native event loop.
//!
//! Drives an [`App`] from a channel of [`UiEvent`]s: page events are
//! dispatched as they arrive, channel fetches run concurrently on the same
//! task, and timers fire at the app's next deadline. Everything stays on one
//! task, so the app is never touched from two places at once.

use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::api::ChannelSource;
use crate::app::{App, AsyncAction, Effect, FetchPurpose, UiEvent};
use crate::surface::Surface;

fn fetch<'a, C: ChannelSource>(
    source: &'a C,
    purpose: FetchPurpose,
) -> LocalBoxFuture<'a, AsyncAction> {
    async move {
        let result = source.fetch_channels().await;
        AsyncAction::ChannelsLoaded(purpose, result)
    }
    .boxed_local()
}

/// Run until `events` closes and no fetch is still in flight. Returns
/// without doing anything when the page is missing its card container.
pub async fn run<S: Surface, C: ChannelSource>(
    app: &mut App<S>,
    source: &C,
    mut events: mpsc::UnboundedReceiver<UiEvent>,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, AsyncAction>> = FuturesUnordered::new();
    let mut events_open = true;

    match app.start() {
        Some(Effect::FetchChannels(purpose)) => in_flight.push(fetch(source, purpose)),
        Some(Effect::ReloadPage) | None => return Ok(()),
    }

    while events_open || !in_flight.is_empty() {
        let deadline = app.next_deadline().map(|d| started + d);

        tokio::select! {
            biased;

            Some(action) = in_flight.next(), if !in_flight.is_empty() => {
                app.handle_async_action(action, started.elapsed());
            }
            event = events.recv(), if events_open => {
                let Some(event) = event else {
                    debug!("event channel closed");
                    events_open = false;
                    continue;
                };
                match app.handle_event(event, started.elapsed()) {
                    Some(Effect::FetchChannels(purpose)) => in_flight.push(fetch(source, purpose)),
                    Some(Effect::ReloadPage) => {
                        info!("reloading");
                        in_flight.clear();
                        app.reset();
                        if let Some(Effect::FetchChannels(purpose)) = app.start() {
                            in_flight.push(fetch(source, purpose));
                        }
                    }
                    None => {}
                }
            }
            _ = sleep_until(deadline.unwrap_or(started)), if deadline.is_some() => {
                app.tick(started.elapsed());
            }
        }
    }

    Ok(())
}
