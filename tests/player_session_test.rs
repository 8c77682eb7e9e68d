mod common;

use common::*;
use tv_malaysia_lib::app::{AsyncAction, Effect, FetchPurpose, UiEvent};
use tv_malaysia_lib::errors::TvError;
use tv_malaysia_lib::surface::{HeadlessSurface, RefreshControl};

fn open(app: &mut tv_malaysia_lib::app::App<HeadlessSurface>, id: &str, at: u64) {
    app.handle_event(UiEvent::WatchClicked(id.to_string()), ms(at));
}

#[test]
fn watch_opens_modal_with_cache_busted_frame() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);

    assert!(app.surface.modal_open);
    assert!(app.surface.scroll_locked);
    assert!(app.surface.loader_visible);
    assert_eq!(app.surface.refresh_control, RefreshControl::Disabled);

    assert_eq!(app.surface.frames.len(), 1);
    let (_, src) = app.surface.current_frame().unwrap();
    assert!(src.starts_with("https://x/a.m3u8?_t="), "got {}", src);

    let info = app.surface.modal_info.clone().unwrap();
    assert_eq!(info.name, "TV1");
    assert_eq!(info.category, "TV Terrestrial");
    assert_eq!(info.now_playing, "Sedang Main: Program 1");
    assert_eq!(info.language, "Bahasa: Melayu");
    assert_eq!(info.quality, "Kualiti: HD");
    assert_eq!(info.kind, "Jenis: 24h");

    assert_eq!(app.surface.stream_buttons.len(), 1);
    assert_eq!(app.surface.stream_buttons[0].label, "Stream 1");
    assert!(app.surface.stream_buttons[0].active);
}

#[test]
fn close_detaches_frame_and_clears_session() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);
    let frame = app.session.current_frame().unwrap();

    app.handle_event(UiEvent::CloseClicked, ms(500));

    assert!(!app.surface.modal_open);
    assert!(!app.surface.scroll_locked);
    assert!(!app.surface.loader_visible);
    assert!(app.surface.frames.is_empty());
    assert!(app.surface.detached.contains(&frame));
    assert!(app.session.open_channel().is_none());
    assert!(app.session.active_stream_url().is_none());
    assert_eq!(app.session.current_frame(), None);
}

#[test]
fn channel_without_streams_shows_placeholder() {
    let mut app = loaded_app();
    open(&mut app, "alhijrah", 0);

    assert!(app.surface.modal_open);
    assert!(app.surface.frames.is_empty());
    assert!(!app.surface.loader_visible);
    assert!(app.surface.stream_buttons.is_empty());
    assert!(app.surface.placeholder.is_some());
    assert_eq!(app.surface.refresh_control, RefreshControl::Disabled);

    // Nothing to refresh
    assert_eq!(app.handle_event(UiEvent::RefreshClicked, ms(10)), None);
}

#[test]
fn stream_buttons_are_mutually_exclusive() {
    let mut app = loaded_app();
    open(&mut app, "arena", 0);
    assert_eq!(app.surface.stream_buttons.len(), 3);

    app.handle_event(UiEvent::StreamSelected(1), ms(100));

    let active = app.surface.active_buttons();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].label, "Stream 2");
    assert_eq!(app.surface.frames.len(), 1);
    let (_, src) = app.surface.current_frame().unwrap();
    assert!(src.starts_with("https://x/arena-sd?q=low&_t="), "got {}", src);
    assert_eq!(app.session.active_stream_url(), Some("https://x/arena-sd?q=low"));

    // Out of range leaves the selection alone
    app.handle_event(UiEvent::StreamSelected(7), ms(200));
    assert_eq!(app.surface.active_buttons()[0].label, "Stream 2");
}

#[test]
fn opening_another_channel_replaces_the_frame() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);
    open(&mut app, "awani", 100);

    assert_eq!(app.surface.frames.len(), 1);
    assert!(app.surface.current_frame().unwrap().1.starts_with("https://x/awani?_t="));
    assert_eq!(app.session.open_channel().map(|c| c.id.as_str()), Some("awani"));
}

#[test]
fn missing_player_opens_stream_externally() {
    let mut app = new_app(HeadlessSurface::without_player());
    app.start();
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Initial, Ok(sample_channels())),
        ms(0),
    );

    open(&mut app, "tv1", 0);
    assert_eq!(app.surface.external_opens, vec!["https://x/a.m3u8".to_string()]);
    assert!(!app.surface.modal_open);

    open(&mut app, "alhijrah", 10);
    assert_eq!(app.surface.external_opens.len(), 1);
}

#[test]
fn unknown_channel_id_is_ignored() {
    let mut app = loaded_app();
    open(&mut app, "tiada", 0);

    assert!(!app.surface.modal_open);
    assert!(app.surface.frames.is_empty());
    assert!(!app.session.is_open());
}

#[test]
fn frame_load_hides_loader_and_enables_refresh() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);
    let frame = app.session.current_frame().unwrap();

    app.handle_event(UiEvent::FrameLoaded(frame), ms(800));

    assert!(!app.surface.loader_visible);
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
    // Load timeout was cancelled; only the ad is still pending
    app.tick(ms(6_000));
    assert_eq!(app.next_deadline(), None);
}

#[test]
fn loader_gives_up_after_timeout() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);

    app.tick(ms(4_000));
    assert!(app.surface.loader_visible);
    app.tick(ms(5_000));
    assert!(!app.surface.loader_visible);
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
}

#[test]
fn ad_banner_loads_once_shortly_after_open() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);

    app.tick(ms(50));
    assert_eq!(app.surface.ad_loads, 0);
    app.tick(ms(100));
    assert_eq!(app.surface.ad_loads, 1);
    app.tick(ms(1_000));
    assert_eq!(app.surface.ad_loads, 1);
}

#[test]
fn refresh_reloads_stream_with_fresh_data() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);
    let first_frame = app.session.current_frame().unwrap();

    assert_eq!(
        app.handle_event(UiEvent::RefreshClicked, ms(1_000)),
        Some(Effect::FetchChannels(FetchPurpose::Refresh))
    );
    assert_eq!(app.surface.refresh_control, RefreshControl::Busy);
    assert!(app.surface.loader_visible);
    assert_eq!(app.surface.dimmed, Some(first_frame));

    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Refresh, Ok(sample_channels())),
        ms(1_200),
    );

    let second_frame = app.session.current_frame().unwrap();
    assert_ne!(first_frame, second_frame);
    assert!(app.surface.detached.contains(&first_frame));
    assert_eq!(app.surface.frames.len(), 1);
    assert_eq!(app.surface.mounted.len(), 2);
    assert_ne!(app.surface.mounted[0], app.surface.mounted[1]);
    assert!(app.surface.mounted[1].starts_with("https://x/a.m3u8?_t="));

    let info = app.surface.modal_info.clone().unwrap();
    assert_eq!(info.now_playing, "Sedang Main: Program 2");
    assert_eq!(app.surface.refresh_control, RefreshControl::Busy);

    app.tick(ms(3_100));
    assert_eq!(app.surface.refresh_control, RefreshControl::Busy);
    app.tick(ms(3_200));
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
    assert!(!app.session.is_refreshing());
}

#[test]
fn refresh_keeps_selected_stream() {
    let mut app = loaded_app();
    open(&mut app, "arena", 0);
    app.handle_event(UiEvent::StreamSelected(2), ms(10));

    app.handle_event(UiEvent::RefreshClicked, ms(100));
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Refresh, Ok(sample_channels())),
        ms(200),
    );

    let (_, src) = app.surface.current_frame().unwrap();
    assert!(src.starts_with("https://x/arena-backup?_t="), "got {}", src);
    assert_eq!(app.surface.active_buttons()[0].label, "Stream 3");
}

#[test]
fn refresh_failure_keeps_current_frame() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);
    let frame = app.session.current_frame().unwrap();
    let renders = app.surface.grid_renders;

    app.handle_event(UiEvent::RefreshClicked, ms(1_000));
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(
            FetchPurpose::Refresh,
            Err(TvError::Network("connection reset".into())),
        ),
        ms(1_500),
    );

    assert_eq!(app.session.current_frame(), Some(frame));
    assert_eq!(app.surface.frames.len(), 1);
    assert!(!app.surface.loader_visible);
    assert_eq!(app.surface.dimmed, None);
    assert_eq!(app.surface.grid_renders, renders);
    assert_eq!(app.session.open_channel().map(|c| c.id.as_str()), Some("tv1"));
    assert!(app.store.is_empty());

    assert_eq!(app.surface.refresh_control, RefreshControl::Busy);
    app.tick(ms(3_500));
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
}

#[test]
fn refresh_without_open_player_does_nothing() {
    let mut app = loaded_app();
    assert_eq!(app.handle_event(UiEvent::RefreshClicked, ms(0)), None);
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
}

#[test]
fn overlapping_refreshes_settle_on_last_result() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);

    app.handle_event(UiEvent::RefreshClicked, ms(100));
    app.handle_event(UiEvent::RefreshClicked, ms(150));
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Refresh, Ok(sample_channels())),
        ms(300),
    );
    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Refresh, Ok(sample_channels())),
        ms(400),
    );

    assert_eq!(app.surface.frames.len(), 1);
    assert_eq!(app.surface.mounted.len(), 3);
    assert_eq!(
        app.surface.modal_info.as_ref().map(|i| i.now_playing.as_str()),
        Some("Sedang Main: Program 3")
    );

    // Re-enable follows the later completion
    app.tick(ms(2_300));
    assert_eq!(app.surface.refresh_control, RefreshControl::Busy);
    app.tick(ms(2_400));
    assert_eq!(app.surface.refresh_control, RefreshControl::Ready);
}

#[test]
fn escape_and_scrim_close_but_content_clicks_do_not() {
    let mut app = loaded_app();
    open(&mut app, "tv1", 0);

    app.handle_event(UiEvent::ModalClicked { on_scrim: false }, ms(10));
    assert!(app.surface.modal_open);
    app.handle_event(UiEvent::KeyDown("Enter".into()), ms(20));
    assert!(app.surface.modal_open);

    app.handle_event(UiEvent::KeyDown("Escape".into()), ms(30));
    assert!(!app.surface.modal_open);
    assert!(!app.session.is_open());

    open(&mut app, "awani", 40);
    app.handle_event(UiEvent::ModalClicked { on_scrim: true }, ms(50));
    assert!(!app.surface.modal_open);
    assert!(app.surface.frames.is_empty());
}

#[test]
fn escape_with_closed_player_is_a_no_op() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::KeyDown("Escape".into()), ms(0));
    assert!(app.surface.detached.is_empty());
    assert!(!app.surface.scroll_locked);
}

#[test]
fn stale_frame_load_after_switch_keeps_loader() {
    let mut app = loaded_app();
    open(&mut app, "arena", 0);
    let first = app.session.current_frame().unwrap();
    app.handle_event(UiEvent::StreamSelected(1), ms(10));

    app.handle_event(UiEvent::FrameLoaded(first), ms(20));
    assert!(app.surface.loader_visible);
}
