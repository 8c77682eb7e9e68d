use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlIFrameElement, HtmlInputElement,
    HtmlOptionElement, HtmlScriptElement, HtmlSelectElement, KeyboardEvent,
};

use crate::api::{ChannelClient, ChannelSource};
use crate::app::{App, AsyncAction, Effect, FetchPurpose, UiEvent};
use crate::config::{AdBannerConfig, AppConfig, PreferenceStorage, Preferences};
use crate::errors::PageRegion;
use crate::render::{HeroStats, RenderedGrid};
use crate::surface::{FrameId, ModalInfo, PageSurface, PlayerSurface, RefreshControl, StreamButton};

/// How often queued events are drained and timers checked
const PUMP_INTERVAL_MS: i32 = 50;

type EventQueue = Rc<RefCell<VecDeque<UiEvent>>>;

struct LocalStorage(Option<web_sys::Storage>);

impl PreferenceStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.as_ref().and_then(|s| s.get_item(key).ok().flatten())
    }
}

/// The real page, addressed by the element ids in `index.html`.
pub struct DomSurface {
    document: Document,
    queue: EventQueue,
    ad: AdBannerConfig,
    frame: Option<(FrameId, HtmlIFrameElement)>,
}

impl DomSurface {
    fn new(document: Document, queue: EventQueue, ad: AdBannerConfig) -> Self {
        Self {
            document,
            queue,
            ad,
            frame: None,
        }
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(&self, id: &str, hidden: bool) {
        if let Some(el) = self.by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_style(el: &Element, property: &str, value: &str) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }
}

impl PageSurface for DomSurface {
    fn has_region(&self, region: PageRegion) -> bool {
        match region {
            PageRegion::Cards => self.by_id("cards").is_some(),
            PageRegion::PlayerModal => self.by_id("playerModal").is_some(),
        }
    }

    fn show_grid(&mut self, grid: &RenderedGrid) {
        let Some(cards) = self.by_id("cards") else {
            error!("cards container not found");
            return;
        };
        if grid.no_results && self.by_id("noResults").is_some() {
            cards.set_inner_html("");
            self.set_hidden("noResults", false);
        } else {
            self.set_hidden("noResults", true);
            cards.set_inner_html(&grid.html);
        }
    }

    fn show_error_panel(&mut self, html: &str) {
        self.set_hidden("noResults", true);
        if let Some(cards) = self.by_id("cards") {
            cards.set_inner_html(html);
        }
    }

    fn set_hero_stats(&mut self, stats: HeroStats) {
        let total = stats.total.to_string();
        let live = stats.live.to_string();
        self.set_text("totalChannels", &total);
        self.set_text("liveNow", &live);
        self.set_text("footer-total-channels", &total);
        self.set_text("footer-live-channels", &live);
    }

    fn set_category_options(&mut self, options: &[(String, String)]) {
        let Some(select) = self
            .by_id("filterCategory")
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        while select.length() > 1 {
            select.remove_with_index(1);
        }
        for (value, label) in options {
            if let Ok(option) = HtmlOptionElement::new_with_text_and_value(label, value) {
                let _ = select.append_child(&option);
            }
        }
    }

    fn set_category_value(&mut self, value: &str) {
        if let Some(select) = self
            .by_id("filterCategory")
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(value);
        }
    }

    fn set_status_value(&mut self, value: &str) {
        if let Some(select) = self
            .by_id("filterStatus")
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(value);
        }
    }

    fn set_search_text(&mut self, text: &str) {
        if let Some(input) = self
            .by_id("search")
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(text);
        }
    }

    fn set_filters_open(&mut self, open: bool) {
        if let Some(el) = self.by_id("filters") {
            let _ = el.class_list().toggle_with_force("open", open);
        }
    }

    fn set_contact_button_hidden(&mut self, hidden: bool) {
        if let Some(el) = self.by_id("telegramFloat") {
            if hidden {
                Self::set_style(&el, "display", "none");
            }
        }
    }
}

impl PlayerSurface for DomSurface {
    fn player_available(&self) -> bool {
        self.by_id("playerModal").is_some() && self.by_id("playerContainer").is_some()
    }

    fn show_modal(&mut self, info: &ModalInfo) {
        self.set_text("player-channel-name", &info.name);
        self.set_text("player-channel-category", &info.category);
        self.update_info(info);
        if let Some(container) = self.by_id("playerContainer") {
            container.set_inner_html("");
        }
        self.set_hidden("playerModal", false);
    }

    fn hide_modal(&mut self) {
        self.set_hidden("playerModal", true);
    }

    fn update_info(&mut self, info: &ModalInfo) {
        self.set_text("player-now-playing", &info.now_playing);
        self.set_text("channel-description", &info.description);
        self.set_text("channel-language", &info.language);
        self.set_text("channel-quality", &info.quality);
        self.set_text("channel-type", &info.kind);
    }

    fn set_stream_buttons(&mut self, buttons: &[StreamButton]) {
        let Some(holder) = self.by_id("streamButtons") else {
            return;
        };
        holder.set_inner_html("");
        for (i, b) in buttons.iter().enumerate() {
            let Ok(btn) = self.document.create_element("button") else {
                continue;
            };
            let class = if b.active { "btn btn-secondary active" } else { "btn btn-secondary" };
            btn.set_class_name(class);
            let _ = btn.set_attribute("type", "button");
            let _ = btn.set_attribute("data-index", &i.to_string());
            let _ = btn.set_attribute("data-url", &b.url);
            let _ = btn.set_attribute("aria-pressed", if b.active { "true" } else { "false" });
            btn.set_text_content(Some(&b.label));
            let _ = holder.append_child(&btn);
        }
    }

    fn show_no_stream_placeholder(&mut self, html: &str) {
        if let Some(container) = self.by_id("playerContainer") {
            container.set_inner_html(html);
        }
    }

    fn mount_frame(&mut self, id: FrameId, src: &str) {
        let Some(container) = self.by_id("playerContainer") else {
            return;
        };
        let Some(iframe) = self
            .document
            .create_element("iframe")
            .ok()
            .and_then(|e| e.dyn_into::<HtmlIFrameElement>().ok())
        else {
            return;
        };

        iframe.set_src(src);
        let _ = iframe.set_attribute("allow", "autoplay; fullscreen; picture-in-picture; encrypted-media");
        iframe.set_allow_fullscreen(true);
        let style = iframe.style();
        let _ = style.set_property("width", "100%");
        let _ = style.set_property("height", "100%");
        let _ = style.set_property("border", "none");
        let _ = style.set_property("opacity", "0");
        let _ = style.set_property("transition", "opacity 0.25s ease");

        let queue = Rc::clone(&self.queue);
        let shown = iframe.clone();
        let on_load = Closure::once_into_js(move || {
            let _ = shown.style().set_property("opacity", "1");
            queue.borrow_mut().push_back(UiEvent::FrameLoaded(id));
        });
        let _ = iframe.add_event_listener_with_callback("load", on_load.unchecked_ref());

        let _ = container.append_child(&iframe);
        self.frame = Some((id, iframe));
    }

    fn detach_frame(&mut self, id: FrameId) {
        if let Some((current, iframe)) = self.frame.take() {
            if current == id {
                iframe.set_src("");
                iframe.remove();
            } else {
                self.frame = Some((current, iframe));
            }
        }
    }

    fn dim_frame(&mut self, id: FrameId, dimmed: bool) {
        if let Some((current, iframe)) = &self.frame {
            if *current == id {
                let _ = iframe
                    .style()
                    .set_property("opacity", if dimmed { "0.3" } else { "1" });
            }
        }
    }

    fn set_loader_visible(&mut self, visible: bool) {
        self.set_hidden("playerLoader", !visible);
    }

    fn set_refresh_control(&mut self, state: RefreshControl) {
        let Some(btn) = self
            .by_id("refreshCurrentStream")
            .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
        else {
            return;
        };
        match state {
            RefreshControl::Ready => {
                btn.set_disabled(false);
                let _ = btn.class_list().remove_1("loading");
                btn.set_inner_html(r#"<span class="btn-icon">🔄</span> Refresh"#);
            }
            RefreshControl::Disabled => btn.set_disabled(true),
            RefreshControl::Busy => {
                btn.set_disabled(true);
                let _ = btn.class_list().add_1("loading");
                btn.set_inner_html(r#"<span class="btn-icon">⏳</span> Refreshing..."#);
            }
        }
    }

    fn set_page_scroll_locked(&mut self, locked: bool) {
        if let Some(body) = self.document.body() {
            let _ = body
                .style()
                .set_property("overflow", if locked { "hidden" } else { "auto" });
        }
    }

    fn open_external(&mut self, url: &str) {
        if let Some(win) = web_sys::window() {
            let _ = win.open_with_url_and_target(url, "_blank");
        }
    }

    fn load_ad_banner(&mut self) {
        let Some(container) = self.by_id(&self.ad.container_id) else {
            return;
        };
        container.set_inner_html("");

        if let Some(options) = self
            .document
            .create_element("script")
            .ok()
            .and_then(|e| e.dyn_into::<HtmlScriptElement>().ok())
        {
            options.set_type("text/javascript");
            let _ = options.set_text(&self.ad.options_script());
            let _ = container.append_child(&options);
        }
        if let Some(invoke) = self
            .document
            .create_element("script")
            .ok()
            .and_then(|e| e.dyn_into::<HtmlScriptElement>().ok())
        {
            invoke.set_type("text/javascript");
            invoke.set_src(&self.ad.script_src());
            invoke.set_async(true);
            let _ = container.append_child(&invoke);
        }
    }
}

struct Inner {
    app: RefCell<App<DomSurface>>,
    queue: EventQueue,
    client: ChannelClient,
    started_ms: f64,
}

impl Inner {
    fn now(&self) -> Duration {
        let now_ms = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(self.started_ms);
        Duration::from_secs_f64(((now_ms - self.started_ms) / 1000.0).max(0.0))
    }
}

fn perform(inner: &Rc<Inner>, effect: Effect) {
    match effect {
        Effect::FetchChannels(purpose) => {
            let inner = Rc::clone(inner);
            wasm_bindgen_futures::spawn_local(async move {
                let result = inner.client.fetch_channels().await;
                let now = inner.now();
                inner
                    .app
                    .borrow_mut()
                    .handle_async_action(AsyncAction::ChannelsLoaded(purpose, result), now);
            });
        }
        Effect::ReloadPage => {
            if let Some(win) = web_sys::window() {
                let _ = win.location().reload();
            }
        }
    }
}

/// Drain queued events and fire due timers. Leaves the queue alone if the
/// app is busy; the next pump picks it up.
fn pump(inner: &Rc<Inner>) {
    let now = inner.now();
    let mut effects = Vec::new();
    {
        let Ok(mut app) = inner.app.try_borrow_mut() else {
            return;
        };
        loop {
            let next = inner.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            if let Some(effect) = app.handle_event(event, now) {
                effects.push(effect);
            }
        }
        app.tick(now);
    }
    for effect in effects {
        perform(inner, effect);
    }
}

fn listen<F>(target: &web_sys::EventTarget, kind: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}

#[wasm_bindgen]
pub struct WasmClient {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl WasmClient {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmClient, JsValue> {
        console_error_panic_hook::set_once();
        crate::logging::init();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let config = AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default config");
            AppConfig::default()
        });
        let preferences = Preferences::read(&LocalStorage(window.local_storage().ok().flatten()));

        let queue: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let surface = DomSurface::new(document, Rc::clone(&queue), config.ad_banner.clone());
        let page_url = window.location().href().ok();
        let client = ChannelClient::from_config(&config.data_url, page_url.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let app = App::new(config, surface).with_preferences(preferences);
        let started_ms = window.performance().map(|p| p.now()).unwrap_or(0.0);

        Ok(WasmClient {
            inner: Rc::new(Inner {
                app: RefCell::new(app),
                queue,
                client,
                started_ms,
            }),
        })
    }

    /// Wire up the page and load the channel list.
    pub fn start(&self) -> Result<(), JsValue> {
        let effect = self.inner.app.borrow_mut().start();
        let Some(effect) = effect else {
            return Ok(());
        };
        self.bind_events()?;
        perform(&self.inner, effect);
        Ok(())
    }
}

impl WasmClient {
    fn push(inner: &Rc<Inner>, event: UiEvent) {
        inner.queue.borrow_mut().push_back(event);
        pump(inner);
    }

    fn bind_events(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let by_id = |id: &str| document.get_element_by_id(id);

        if let Some(search) = by_id("search") {
            let inner = Rc::clone(&self.inner);
            let input = search.clone();
            listen(&search, "input", move |_| {
                if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
                    Self::push(&inner, UiEvent::SearchInput(input.value()));
                }
            });
        }

        if let Some(clear) = by_id("clearSearch") {
            let inner = Rc::clone(&self.inner);
            listen(&clear, "click", move |_| Self::push(&inner, UiEvent::ClearSearch));
        }

        for (id, make) in [
            ("filterCategory", UiEvent::CategoryChanged as fn(String) -> UiEvent),
            ("filterStatus", UiEvent::StatusChanged as fn(String) -> UiEvent),
        ] {
            if let Some(select) = by_id(id) {
                let inner = Rc::clone(&self.inner);
                let el = select.clone();
                listen(&select, "change", move |_| {
                    if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
                        Self::push(&inner, make(select.value()));
                    }
                });
            }
        }

        if let Some(menu) = by_id("menuToggle") {
            let inner = Rc::clone(&self.inner);
            listen(&menu, "click", move |_| Self::push(&inner, UiEvent::MenuToggle));
        }

        if let Some(close) = by_id("closePlayerModal") {
            let inner = Rc::clone(&self.inner);
            listen(&close, "click", move |_| Self::push(&inner, UiEvent::CloseClicked));
        }

        if let Some(modal) = by_id("playerModal") {
            let inner = Rc::clone(&self.inner);
            listen(&modal, "click", move |e: Event| {
                let on_scrim = match (e.target(), e.current_target()) {
                    (Some(t), Some(c)) => t == c,
                    _ => false,
                };
                Self::push(&inner, UiEvent::ModalClicked { on_scrim });
            });
        }

        if let Some(refresh) = by_id("refreshCurrentStream") {
            let inner = Rc::clone(&self.inner);
            listen(&refresh, "click", move |_| Self::push(&inner, UiEvent::RefreshClicked));
        }

        if let Some(streams) = by_id("streamButtons") {
            let inner = Rc::clone(&self.inner);
            listen(&streams, "click", move |e: Event| {
                let index = closest(&e, "button[data-index]")
                    .and_then(|b| b.get_attribute("data-index"))
                    .and_then(|i| i.parse::<usize>().ok());
                if let Some(index) = index {
                    Self::push(&inner, UiEvent::StreamSelected(index));
                }
            });
        }

        // Cards are re-rendered on every filter change, so their controls
        // are bound once on the container.
        if let Some(cards) = by_id("cards") {
            let inner = Rc::clone(&self.inner);
            listen(&cards, "click", move |e: Event| {
                if let Some(btn) = closest(&e, ".watch-btn") {
                    if let Some(id) = btn.get_attribute("data-id") {
                        let event = UiEvent::WatchClicked(id);
                        if event.stops_propagation() {
                            e.prevent_default();
                            e.stop_propagation();
                        }
                        Self::push(&inner, event);
                    }
                } else if closest(&e, "#reloadBtn").is_some() {
                    Self::push(&inner, UiEvent::RetryClicked);
                }
            });
        }

        if let Ok(buttons) = document.query_selector_all(".category-btn") {
            for i in 0..buttons.length() {
                let Some(btn) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let inner = Rc::clone(&self.inner);
                let el = btn.clone();
                listen(&btn, "click", move |_| {
                    if let Some(cat) = el.get_attribute("data-category") {
                        Self::push(&inner, UiEvent::CategoryButton(cat));
                    }
                });
            }
        }

        {
            let inner = Rc::clone(&self.inner);
            listen(&document, "keydown", move |e: Event| {
                if let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) {
                    Self::push(&inner, UiEvent::KeyDown(key));
                }
            });
        }

        let inner = Rc::clone(&self.inner);
        let tick = Closure::<dyn FnMut()>::new(move || pump(&inner));
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            PUMP_INTERVAL_MS,
        )?;
        tick.forget();

        Ok(())
    }
}
