mod common;

use common::*;
use tv_malaysia_lib::app::{AsyncAction, Effect, FetchPurpose, UiEvent};
use tv_malaysia_lib::config::Preferences;
use tv_malaysia_lib::errors::TvError;
use tv_malaysia_lib::filter::FilterState;
use tv_malaysia_lib::surface::HeadlessSurface;

#[test]
fn initial_load_renders_every_channel_live_first() {
    let app = loaded_app();

    assert!(app.initialized);
    assert_eq!(card_ids(&app), vec!["arena", "awani", "tv1", "alhijrah", "tv3"]);
    assert_eq!(app.surface.hero.total, 5);
    assert_eq!(app.surface.hero.live, 3);
    assert_eq!(app.surface.category_options.len(), 6);
    assert_eq!(
        app.surface.category_options[0],
        ("terrestrial".to_string(), "TV Terrestrial".to_string())
    );
}

#[test]
fn load_failure_shows_error_panel_with_retry() {
    let mut app = new_app(HeadlessSurface::new());
    assert_eq!(app.start(), Some(Effect::FetchChannels(FetchPurpose::Initial)));

    app.handle_async_action(
        AsyncAction::ChannelsLoaded(FetchPurpose::Initial, Err(TvError::ServerError(500))),
        ms(0),
    );

    assert!(app.store.is_empty());
    assert!(app.store.get("tv1").is_none());
    let panel = app.surface.error_panel.clone().expect("error panel shown");
    assert!(panel.contains("reloadBtn"));
    assert!(panel.contains("500"));
    assert!(app.surface.grid.is_none());

    assert_eq!(app.handle_event(UiEvent::RetryClicked, ms(10)), Some(Effect::ReloadPage));
}

#[test]
fn missing_card_container_aborts_start() {
    let mut app = new_app(HeadlessSurface::without_cards());
    assert_eq!(app.start(), None);
    assert!(app.surface.grid.is_none());
}

#[test]
fn missing_player_does_not_block_start() {
    let mut app = new_app(HeadlessSurface::without_player());
    assert!(app.start().is_some());
}

#[test]
fn contact_button_preference_applied_at_start() {
    let mut storage = std::collections::HashMap::new();
    storage.insert("telegramHidden".to_string(), "true".to_string());

    let mut app = new_app(HeadlessSurface::new()).with_preferences(Preferences::read(&storage));
    app.start();
    assert!(app.surface.contact_button_hidden);
}

#[test]
fn search_is_debounced_to_final_keystroke() {
    let mut app = loaded_app();
    let renders = app.surface.grid_renders;

    app.handle_event(UiEvent::SearchInput("t".into()), ms(1_000));
    app.handle_event(UiEvent::SearchInput("tv".into()), ms(1_100));
    // Third keystroke within 250ms of the second
    app.handle_event(UiEvent::SearchInput("tv3".into()), ms(1_200));

    app.tick(ms(1_350));
    assert_eq!(app.surface.grid_renders, renders, "second keystroke must not fire");
    assert_eq!(app.next_deadline(), Some(ms(1_450)));

    app.tick(ms(1_450));
    assert_eq!(app.surface.grid_renders, renders + 1);
    assert_eq!(app.filter.query, "tv3");
    assert_eq!(card_ids(&app), vec!["tv3"]);

    app.tick(ms(2_000));
    assert_eq!(app.surface.grid_renders, renders + 1);
}

#[test]
fn non_matching_search_shows_no_results() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::SearchInput("tiada-padanan".into()), ms(0));
    app.tick(ms(250));

    let grid = app.surface.grid.clone().unwrap();
    assert!(grid.no_results);
    assert!(grid.watch_ids.is_empty());
    assert!(!grid.html.contains("channel-card"));
}

#[test]
fn clear_search_drops_pending_text() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::SearchInput("awani".into()), ms(0));
    app.handle_event(UiEvent::ClearSearch, ms(50));

    assert_eq!(card_ids(&app).len(), 5);
    assert_eq!(app.surface.search_text, "");

    app.tick(ms(500));
    assert_eq!(card_ids(&app).len(), 5);
}

#[test]
fn selector_changes_apply_immediately() {
    let mut app = loaded_app();

    app.handle_event(UiEvent::CategoryChanged("terrestrial".into()), ms(0));
    assert_eq!(card_ids(&app), vec!["tv1", "tv3"]);

    app.handle_event(UiEvent::StatusChanged("live".into()), ms(0));
    assert_eq!(card_ids(&app), vec!["tv1"]);

    app.handle_event(UiEvent::CategoryChanged("all".into()), ms(0));
    app.handle_event(UiEvent::StatusChanged("all".into()), ms(0));
    assert_eq!(card_ids(&app).len(), 5);
}

#[test]
fn selector_change_picks_up_typed_search() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::SearchInput("astro".into()), ms(0));
    app.handle_event(UiEvent::StatusChanged("live".into()), ms(10));

    assert_eq!(card_ids(&app), vec!["arena", "awani"]);
    assert_eq!(app.next_deadline(), None);
}

#[test]
fn category_button_sets_selector() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::CategoryButton("sukan".into()), ms(0));

    assert_eq!(app.surface.category_value, "sukan");
    assert_eq!(card_ids(&app), vec!["arena"]);
}

#[test]
fn menu_toggle_flips_filter_panel() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::MenuToggle, ms(0));
    assert!(app.surface.filters_open);
    app.handle_event(UiEvent::MenuToggle, ms(0));
    assert!(!app.surface.filters_open);
}

#[test]
fn watch_click_is_the_only_event_that_stops_propagation() {
    assert!(UiEvent::WatchClicked("tv1".into()).stops_propagation());
    assert!(!UiEvent::CategoryButton("sukan".into()).stops_propagation());
    assert!(!UiEvent::ModalClicked { on_scrim: true }.stops_propagation());
}

#[test]
fn reset_returns_to_a_fresh_page() {
    let mut app = loaded_app();
    app.handle_event(UiEvent::CategoryChanged("sukan".into()), ms(0));
    app.handle_event(UiEvent::StatusChanged("live".into()), ms(0));
    app.handle_event(UiEvent::MenuToggle, ms(0));
    app.handle_event(UiEvent::WatchClicked("arena".into()), ms(10));
    app.handle_event(UiEvent::SearchInput("arena".into()), ms(20));

    app.reset();

    assert_eq!(app.filter, FilterState::new());
    assert!(!app.filters_open);
    assert!(!app.surface.filters_open);
    assert_eq!(app.surface.category_value, "all");
    assert_eq!(app.surface.status_value, "all");
    assert_eq!(app.surface.search_text, "");
    assert!(!app.session.is_open());
    assert!(!app.surface.modal_open);
    assert!(app.surface.frames.is_empty());
    assert!(app.store.is_empty());
    assert!(!app.initialized);
    assert_eq!(app.next_deadline(), None);
}
