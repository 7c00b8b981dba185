//! Client-side controller for the Sheriff Looper landing page.
//!
//! Wires loading-screen timing, mobile/desktop branching, the embedded game
//! frame (theater and fullscreen presentation), the help modal, keyboard
//! shortcuts, scroll-driven navigation highlighting, link sharing, and the
//! walkthrough accordion over the fixed page markup.

use js_sys::{Function, Reflect};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, DocumentReadyState, Element, Event, HtmlDetailsElement, HtmlDocument, HtmlElement,
    HtmlIFrameElement, HtmlTextAreaElement, KeyboardEvent, Node, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, ShareData, Window,
};

pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const LOADING_MIN_TIME_MS: f64 = 300.0;
pub const ANIMATION_DURATION_MS: i32 = 200;

const LOADING_SETTLE_MS: i32 = 500;
const RESIZE_DEBOUNCE_MS: i32 = 250;
const TOAST_DURATION_MS: i32 = 2000;
const COPY_RESET_MS: i32 = 2000;
const NAV_SCROLL_OFFSET_PX: f64 = 150.0;

const SHARE_TITLE: &str = "Sheriff Looper - Western Horror Adventure";
const SHARE_TEXT: &str =
    "Check out Sheriff Looper - A Western horror action-adventure pixel game!";
const EMBED_ORIGIN: &str = "https://itch.io";

const TOAST_BASE_STYLE: &str = "position:fixed;bottom:20px;left:50%;\
    transform:translateX(-50%);background:rgba(35,30,25,0.95);\
    border:2px solid #E8A849;padding:12px 24px;\
    font-family:'Press Start 2P',cursive;font-size:10px;color:#E8A849;\
    z-index:9999;";

const TOAST_KEYFRAMES: &str = "\
@keyframes toastIn {\
  from { opacity: 0; transform: translateX(-50%) translateY(20px); }\
  to { opacity: 1; transform: translateX(-50%) translateY(0); }\
}\
@keyframes toastOut {\
  from { opacity: 1; transform: translateX(-50%) translateY(0); }\
  to { opacity: 0; transform: translateX(-50%) translateY(20px); }\
}";

static MOBILE_UA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"android|webos|iphone|ipad|ipod|blackberry|iemobile|opera mini").unwrap()
});
static IOS_UA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"iPad|iPhone|iPod").unwrap());

/// One presentation mode of the embedded game frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Off,
    On,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Off => Mode::On,
            Mode::On => Mode::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == Mode::On
    }
}

/// Theater (in-page expansion) and browser fullscreen are independent; both
/// may be active at once.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PresentationModes {
    pub theater: Mode,
    pub fullscreen: Mode,
}

struct PageState {
    presentation: PresentationModes,
    sound_on: bool,
    mobile_view: bool,
    // Recorded once the loading layer is gone; nothing branches on it yet.
    #[allow(dead_code)]
    load_complete: bool,
}

impl PageState {
    fn new() -> Self {
        Self {
            presentation: PresentationModes {
                theater: Mode::Off,
                fullscreen: Mode::Off,
            },
            sound_on: true,
            mobile_view: false,
            load_complete: false,
        }
    }
}

/// Fixed page structure, looked up once at startup. Every element is optional;
/// a missing element disables the feature that uses it instead of failing.
struct PageElements {
    document: Document,
    loading_screen: Option<HtmlElement>,
    main_container: Option<HtmlElement>,
    game_wrapper: Option<HtmlElement>,
    game_container: Option<HtmlElement>,
    game_iframe: Option<HtmlIFrameElement>,
    game_overlay: Option<HtmlElement>,
    play_button: Option<HtmlElement>,
    theater_btn: Option<HtmlElement>,
    fullscreen_btn: Option<HtmlElement>,
    sound_btn: Option<HtmlElement>,
    help_btn: Option<HtmlElement>,
    theater_exit_btn: Option<HtmlElement>,
    help_modal: Option<HtmlElement>,
    modal_close: Option<HtmlElement>,
    floating_controls: Option<HtmlElement>,
    mobile_page: Option<HtmlElement>,
    copy_link_btn: Option<HtmlElement>,
    share_btn: Option<HtmlElement>,
    nav_links: Vec<HtmlElement>,
}

impl PageElements {
    fn lookup(document: &Document) -> Self {
        let nav_links = match document.query_selector_all(".nav-link") {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
                .collect(),
            Err(_) => Vec::new(),
        };

        Self {
            document: document.clone(),
            loading_screen: by_id(document, "loading-screen"),
            main_container: by_id(document, "main-container"),
            game_wrapper: by_id(document, "game-wrapper"),
            game_container: by_id(document, "game-container"),
            game_iframe: by_id(document, "game-iframe"),
            game_overlay: by_id(document, "game-overlay"),
            play_button: by_id(document, "play-button"),
            theater_btn: by_id(document, "theater-btn"),
            fullscreen_btn: by_id(document, "fullscreen-btn"),
            sound_btn: by_id(document, "sound-btn"),
            help_btn: by_id(document, "help-btn"),
            theater_exit_btn: by_id(document, "theater-exit-btn"),
            help_modal: by_id(document, "help-modal"),
            modal_close: by_id(document, "modal-close"),
            floating_controls: by_id(document, "floating-controls"),
            mobile_page: by_id(document, "mobile-page"),
            copy_link_btn: by_id(document, "copy-link-btn"),
            share_btn: by_id(document, "share-btn"),
            nav_links,
        }
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

fn window() -> Window {
    web_sys::window().expect("missing window")
}

fn performance_now() -> f64 {
    window().performance().map(|p| p.now()).unwrap_or(0.0)
}

fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn js_function(target: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(|err| js_value_to_string(&err))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{} missing", name))
}

fn js_error_name(err: &JsValue) -> Option<String> {
    Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string())
}

/// Schedule a one-shot callback on the page timer queue.
fn run_after<F: FnOnce() + 'static>(delay_ms: i32, callback: F) {
    let cb = Closure::once_into_js(callback);
    let _ = window()
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms);
}

fn add_class(el: Option<&HtmlElement>, name: &str) {
    if let Some(el) = el {
        let _ = el.class_list().add_1(name);
    }
}

fn remove_class(el: Option<&HtmlElement>, name: &str) {
    if let Some(el) = el {
        let _ = el.class_list().remove_1(name);
    }
}

fn has_class(el: Option<&HtmlElement>, name: &str) -> bool {
    el.map(|el| el.class_list().contains(name)).unwrap_or(false)
}

fn set_body_overflow(document: &Document, value: Option<&str>) {
    let Some(body) = document.body() else {
        return;
    };
    match value {
        Some(v) => {
            let _ = body.style().set_property("overflow", v);
        }
        None => {
            let _ = body.style().remove_property("overflow");
        }
    }
}

fn focus_game_frame(els: &PageElements) {
    if let Some(iframe) = els.game_iframe.as_ref() {
        let _ = iframe.focus();
    }
}

// ---------------------------------------------------------------------------
// Pure decision logic, shared with the native tests.
// ---------------------------------------------------------------------------

/// Remaining time the loading screen must stay visible after the load event.
pub fn loading_delay_ms(min_time_ms: f64, elapsed_ms: f64) -> i32 {
    (min_time_ms - elapsed_ms).max(0.0) as i32
}

/// A device is mobile when its user agent names a mobile OS, or when the
/// viewport is narrow and a touch capability signal is present.
pub fn is_mobile_device(user_agent: &str, viewport_width: f64, has_touch: bool) -> bool {
    MOBILE_UA_PATTERN.is_match(&user_agent.to_lowercase())
        || (viewport_width <= MOBILE_BREAKPOINT_PX && has_touch)
}

pub fn is_ios_device(user_agent: &str) -> bool {
    IOS_UA_PATTERN.is_match(user_agent)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShortcutAction {
    ToggleFullscreen,
    ToggleTheater,
    ToggleSound,
    DismissOverlays,
}

/// Map a keystroke to its page action. Ctrl/meta combinations are left to the
/// browser, except for Escape which always dismisses.
pub fn shortcut_for(key: &str, ctrl: bool, meta: bool) -> Option<ShortcutAction> {
    match key.to_lowercase().as_str() {
        "f" if !ctrl && !meta => Some(ShortcutAction::ToggleFullscreen),
        "t" if !ctrl && !meta => Some(ShortcutAction::ToggleTheater),
        "m" if !ctrl && !meta => Some(ShortcutAction::ToggleSound),
        "escape" => Some(ShortcutAction::DismissOverlays),
        _ => None,
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SectionSpan {
    pub top: f64,
    pub height: f64,
}

/// Index of the section whose vertical span contains `scroll_pos`, if any.
pub fn section_at(scroll_pos: f64, sections: &[SectionSpan]) -> Option<usize> {
    sections
        .iter()
        .position(|s| scroll_pos >= s.top && scroll_pos < s.top + s.height)
}

pub fn copy_button_labels(copied: bool) -> (&'static str, &'static str) {
    if copied {
        ("\u{2713}", " Copied!")
    } else {
        ("\u{1F4CB}", " Copy Link")
    }
}

// ---------------------------------------------------------------------------
// Toast notifications
// ---------------------------------------------------------------------------

fn install_toast_keyframes(document: &Document) {
    if document.get_element_by_id("toast-keyframes").is_some() {
        return;
    }
    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id("toast-keyframes");
    style.set_text_content(Some(TOAST_KEYFRAMES));
    if let Some(head) = document.head() {
        let _ = head.append_child(&style);
    }
}

/// Show a transient toast, replacing any toast already on screen.
pub fn show_toast(document: &Document, message: &str) {
    if let Ok(Some(existing)) = document.query_selector(".toast") {
        existing.remove();
    }

    let Ok(toast) = document.create_element("div") else {
        return;
    };
    toast.set_class_name("toast");
    toast.set_text_content(Some(message));
    let _ = toast.set_attribute(
        "style",
        &format!("{TOAST_BASE_STYLE}animation:toastIn {ANIMATION_DURATION_MS}ms ease;"),
    );

    let Some(body) = document.body() else {
        return;
    };
    if body.append_child(&toast).is_err() {
        return;
    }

    let fading = toast.clone();
    run_after(TOAST_DURATION_MS, move || {
        let _ = fading.set_attribute(
            "style",
            &format!("{TOAST_BASE_STYLE}animation:toastOut {ANIMATION_DURATION_MS}ms ease;"),
        );
        let expired = fading.clone();
        run_after(ANIMATION_DURATION_MS, move || expired.remove());
    });
}

// ---------------------------------------------------------------------------
// Loading gate
// ---------------------------------------------------------------------------

fn reveal_main_content(els: &Rc<PageElements>, state: &Rc<RefCell<PageState>>, elapsed_ms: f64) {
    let els_reveal = Rc::clone(els);
    let state_reveal = Rc::clone(state);

    run_after(loading_delay_ms(LOADING_MIN_TIME_MS, elapsed_ms), move || {
        add_class(els_reveal.loading_screen.as_ref(), "fade-out");
        remove_class(els_reveal.main_container.as_ref(), "hidden");

        run_after(LOADING_SETTLE_MS, move || {
            if let Some(screen) = els_reveal.loading_screen.as_ref() {
                let _ = screen.style().set_property("display", "none");
            }
            state_reveal.borrow_mut().load_complete = true;
        });
    });
}

fn init_loading_gate(
    els: &Rc<PageElements>,
    state: &Rc<RefCell<PageState>>,
) -> Result<(), JsValue> {
    // Wasm instantiation can finish after the load event has already fired;
    // performance.now() counts from navigation start either way.
    if els.document.ready_state() == DocumentReadyState::Complete {
        reveal_main_content(els, state, performance_now());
        return Ok(());
    }

    let start_ms = performance_now();
    let els_load = Rc::clone(els);
    let state_load = Rc::clone(state);
    let on_load = Closure::wrap(Box::new(move || {
        reveal_main_content(&els_load, &state_load, performance_now() - start_ms);
    }) as Box<dyn FnMut()>);

    window().add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
    on_load.forget();
    Ok(())
}

// ---------------------------------------------------------------------------
// Mobile / desktop branch
// ---------------------------------------------------------------------------

fn detect_mobile() -> bool {
    let win = window();
    let user_agent = win.navigator().user_agent().unwrap_or_default();
    let width = win
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let win_js = JsValue::from(win.clone());
    let has_touch = Reflect::has(&win_js, &JsValue::from_str("ontouchstart")).unwrap_or(false)
        || win.navigator().max_touch_points() > 0;

    is_mobile_device(&user_agent, width, has_touch)
}

fn show_mobile_page(els: &PageElements) {
    remove_class(els.mobile_page.as_ref(), "hidden");
    add_class(els.main_container.as_ref(), "hidden");
    add_class(els.loading_screen.as_ref(), "hidden");
    set_body_overflow(&els.document, Some("auto"));
}

fn hide_mobile_page(els: &PageElements) {
    add_class(els.mobile_page.as_ref(), "hidden");
    remove_class(els.main_container.as_ref(), "hidden");
}

fn init_device_branch(
    els: &Rc<PageElements>,
    state: &Rc<RefCell<PageState>>,
) -> Result<(), JsValue> {
    {
        let mut state = state.borrow_mut();
        state.mobile_view = detect_mobile();
        if state.mobile_view {
            show_mobile_page(els);
        }
    }

    // Re-classify only after resize events settle; the view swaps only when
    // the classification actually changes.
    let resize_timer: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));

    let els_settle = Rc::clone(els);
    let state_settle = Rc::clone(state);
    let settle: Rc<Closure<dyn FnMut()>> = Rc::new(Closure::wrap(Box::new(move || {
        let mut state = state_settle.borrow_mut();
        let was_mobile = state.mobile_view;
        state.mobile_view = detect_mobile();

        if state.mobile_view && !was_mobile {
            show_mobile_page(&els_settle);
        } else if !state.mobile_view && was_mobile {
            hide_mobile_page(&els_settle);
        }
    }) as Box<dyn FnMut()>));

    let resize_timer_ev = Rc::clone(&resize_timer);
    let settle_ev = Rc::clone(&settle);
    let on_resize = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(id) = resize_timer_ev.borrow_mut().take() {
            window().clear_timeout_with_handle(id);
        }
        if let Ok(id) = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            settle_ev.as_ref().as_ref().unchecked_ref(),
            RESIZE_DEBOUNCE_MS,
        ) {
            *resize_timer_ev.borrow_mut() = Some(id);
        }
    }) as Box<dyn FnMut(_)>);

    window().add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();
    Ok(())
}

// ---------------------------------------------------------------------------
// Game overlay
// ---------------------------------------------------------------------------

fn dismiss_game_overlay(els: &PageElements) {
    add_class(els.game_overlay.as_ref(), "hidden");
    focus_game_frame(els);
}

fn init_play_overlay(els: &Rc<PageElements>) -> Result<(), JsValue> {
    if let Some(play_button) = els.play_button.as_ref() {
        let els_play = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            dismiss_game_overlay(&els_play);
        }) as Box<dyn FnMut(_)>);
        play_button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    if let Some(overlay) = els.game_overlay.as_ref() {
        // Clicks on overlay children must not dismiss it.
        let overlay_target = JsValue::from(overlay.clone());
        let els_overlay = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |event: Event| {
            let direct = event
                .target()
                .map(|t| JsValue::from(t) == overlay_target)
                .unwrap_or(false);
            if direct {
                dismiss_game_overlay(&els_overlay);
            }
        }) as Box<dyn FnMut(_)>);
        overlay.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Presentation modes
// ---------------------------------------------------------------------------

fn toggle_theater_mode(els: &PageElements, state: &mut PageState) {
    state.presentation.theater = state.presentation.theater.toggled();

    if state.presentation.theater.is_on() {
        add_class(els.game_wrapper.as_ref(), "theater-mode");
        remove_class(els.theater_exit_btn.as_ref(), "hidden");
        add_class(els.theater_btn.as_ref(), "active");
        set_body_overflow(&els.document, Some("hidden"));
        add_class(els.floating_controls.as_ref(), "hidden");
        show_toast(&els.document, "Theater Mode - Press ESC or T to exit");
    } else {
        remove_class(els.game_wrapper.as_ref(), "theater-mode");
        add_class(els.theater_exit_btn.as_ref(), "hidden");
        remove_class(els.theater_btn.as_ref(), "active");
        set_body_overflow(&els.document, None);
        remove_class(els.floating_controls.as_ref(), "hidden");
    }

    focus_game_frame(els);
}

fn fullscreen_element(document: &Document) -> Option<Element> {
    if let Some(el) = document.fullscreen_element() {
        return Some(el);
    }
    // Older WebKit and Gecko expose prefixed properties only.
    let doc_js = JsValue::from(document.clone());
    for key in ["webkitFullscreenElement", "mozFullScreenElement"] {
        if let Ok(value) = Reflect::get(&doc_js, &JsValue::from_str(key)) {
            if let Ok(el) = value.dyn_into::<Element>() {
                return Some(el);
            }
        }
    }
    None
}

fn request_fullscreen_on(container: &HtmlElement) -> Result<(), JsValue> {
    if container.request_fullscreen().is_ok() {
        return Ok(());
    }
    let target = JsValue::from(container.clone());
    for name in [
        "webkitRequestFullscreen",
        "mozRequestFullScreen",
        "msRequestFullscreen",
    ] {
        if let Ok(request) = js_function(&target, name) {
            request.call0(&target)?;
            return Ok(());
        }
    }
    Err(JsValue::from_str("fullscreen unavailable"))
}

fn exit_fullscreen(document: &Document) {
    let doc_js = JsValue::from(document.clone());
    if Reflect::has(&doc_js, &JsValue::from_str("exitFullscreen")).unwrap_or(false) {
        document.exit_fullscreen();
        return;
    }
    for name in [
        "webkitExitFullscreen",
        "mozCancelFullScreen",
        "msExitFullscreen",
    ] {
        if let Ok(exit) = js_function(&doc_js, name) {
            let _ = exit.call0(&doc_js);
            return;
        }
    }
}

fn toggle_fullscreen(els: &PageElements, state: &mut PageState) {
    if fullscreen_element(&els.document).is_none() {
        let Some(container) = els.game_container.as_ref() else {
            return;
        };
        // The change listener resynchronizes the indicator if the request is
        // denied or the browser exits on its own.
        let _ = request_fullscreen_on(container);
        add_class(els.fullscreen_btn.as_ref(), "active");
        state.presentation.fullscreen = Mode::On;
        show_toast(&els.document, "Fullscreen - Press ESC or F to exit");
    } else {
        exit_fullscreen(&els.document);
        remove_class(els.fullscreen_btn.as_ref(), "active");
        state.presentation.fullscreen = Mode::Off;
    }
}

/// Safe to call redundantly: the browser can leave fullscreen without a page
/// toggle (native Escape), so this only ever clears the indicator.
fn sync_fullscreen_indicator(els: &PageElements, state: &mut PageState) {
    if fullscreen_element(&els.document).is_none() {
        remove_class(els.fullscreen_btn.as_ref(), "active");
        state.presentation.fullscreen = Mode::Off;
    }
}

// ---------------------------------------------------------------------------
// Sound indicator
// ---------------------------------------------------------------------------

fn toggle_sound(els: &PageElements, state: &mut PageState) {
    state.sound_on = !state.sound_on;

    let Some(sound_btn) = els.sound_btn.as_ref() else {
        return;
    };
    let icon = sound_btn.query_selector(".btn-icon").ok().flatten();
    let text = sound_btn.query_selector(".btn-text").ok().flatten();

    if state.sound_on {
        if let Some(icon) = icon {
            icon.set_text_content(Some("\u{1F50A}"));
        }
        if let Some(text) = text {
            text.set_text_content(Some("SOUND"));
        }
        remove_class(Some(sound_btn), "active");
        show_toast(&els.document, "Sound ON");
    } else {
        if let Some(icon) = icon {
            icon.set_text_content(Some("\u{1F507}"));
        }
        if let Some(text) = text {
            text.set_text_content(Some("MUTED"));
        }
        add_class(Some(sound_btn), "active");
        show_toast(&els.document, "Sound OFF");
    }
    // Indicator only. The embedded frame is cross-origin, so there is no
    // channel to actually mute its audio.
}

// ---------------------------------------------------------------------------
// Control cluster wiring
// ---------------------------------------------------------------------------

fn init_game_controls(
    els: &Rc<PageElements>,
    state: &Rc<RefCell<PageState>>,
) -> Result<(), JsValue> {
    for button in [els.theater_btn.as_ref(), els.theater_exit_btn.as_ref()]
        .into_iter()
        .flatten()
    {
        let els_theater = Rc::clone(els);
        let state_theater = Rc::clone(state);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            toggle_theater_mode(&els_theater, &mut state_theater.borrow_mut());
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    if let Some(fullscreen_btn) = els.fullscreen_btn.as_ref() {
        let els_fs = Rc::clone(els);
        let state_fs = Rc::clone(state);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            toggle_fullscreen(&els_fs, &mut state_fs.borrow_mut());
        }) as Box<dyn FnMut(_)>);
        fullscreen_btn
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    for event_name in [
        "fullscreenchange",
        "webkitfullscreenchange",
        "mozfullscreenchange",
    ] {
        let els_sync = Rc::clone(els);
        let state_sync = Rc::clone(state);
        let on_change = Closure::wrap(Box::new(move |_event: Event| {
            sync_fullscreen_indicator(&els_sync, &mut state_sync.borrow_mut());
        }) as Box<dyn FnMut(_)>);
        els.document
            .add_event_listener_with_callback(event_name, on_change.as_ref().unchecked_ref())?;
        on_change.forget();
    }

    if let Some(sound_btn) = els.sound_btn.as_ref() {
        let els_sound = Rc::clone(els);
        let state_sound = Rc::clone(state);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            toggle_sound(&els_sound, &mut state_sound.borrow_mut());
        }) as Box<dyn FnMut(_)>);
        sound_btn.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    if let Some(help_btn) = els.help_btn.as_ref() {
        let els_help = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            remove_class(els_help.help_modal.as_ref(), "hidden");
        }) as Box<dyn FnMut(_)>);
        help_btn.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Help modal
// ---------------------------------------------------------------------------

fn close_help_modal(els: &PageElements) {
    add_class(els.help_modal.as_ref(), "hidden");
}

fn init_help_modal(els: &Rc<PageElements>) -> Result<(), JsValue> {
    if let Some(modal_close) = els.modal_close.as_ref() {
        let els_close = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            close_help_modal(&els_close);
        }) as Box<dyn FnMut(_)>);
        modal_close.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    if let Some(modal) = els.help_modal.as_ref() {
        // Backdrop clicks close; clicks inside the modal body do not.
        let els_backdrop = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |event: Event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map(|el| el.class_list().contains("modal-backdrop"))
                .unwrap_or(false);
            if on_backdrop {
                close_help_modal(&els_backdrop);
            }
        }) as Box<dyn FnMut(_)>);
        modal.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Keyboard shortcuts
// ---------------------------------------------------------------------------

fn init_keyboard_shortcuts(
    els: &Rc<PageElements>,
    state: &Rc<RefCell<PageState>>,
) -> Result<(), JsValue> {
    let els_keys = Rc::clone(els);
    let state_keys = Rc::clone(state);
    let on_keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let tag = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| el.tag_name())
            .unwrap_or_default();
        if tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea") {
            return;
        }

        match shortcut_for(&event.key(), event.ctrl_key(), event.meta_key()) {
            Some(ShortcutAction::ToggleFullscreen) => {
                event.prevent_default();
                toggle_fullscreen(&els_keys, &mut state_keys.borrow_mut());
            }
            Some(ShortcutAction::ToggleTheater) => {
                event.prevent_default();
                toggle_theater_mode(&els_keys, &mut state_keys.borrow_mut());
            }
            Some(ShortcutAction::ToggleSound) => {
                event.prevent_default();
                toggle_sound(&els_keys, &mut state_keys.borrow_mut());
            }
            Some(ShortcutAction::DismissOverlays) => {
                // Theater exit and modal close are independent; one Escape
                // may do both.
                {
                    let mut state = state_keys.borrow_mut();
                    if state.presentation.theater.is_on() {
                        toggle_theater_mode(&els_keys, &mut state);
                    }
                }
                if !has_class(els_keys.help_modal.as_ref(), "hidden") {
                    close_help_modal(&els_keys);
                }
            }
            None => {}
        }
    }) as Box<dyn FnMut(_)>);

    els.document
        .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();
    Ok(())
}

// ---------------------------------------------------------------------------
// Navigation highlighter
// ---------------------------------------------------------------------------

fn update_active_nav(els: &PageElements, sections: &[(HtmlElement, String)]) {
    let scroll_pos = window().scroll_y().unwrap_or(0.0) + NAV_SCROLL_OFFSET_PX;
    let spans: Vec<SectionSpan> = sections
        .iter()
        .map(|(el, _)| SectionSpan {
            top: el.offset_top() as f64,
            height: el.offset_height() as f64,
        })
        .collect();
    let active_href = section_at(scroll_pos, &spans).map(|idx| format!("#{}", sections[idx].1));

    for link in &els.nav_links {
        let href = link.get_attribute("href").unwrap_or_default();
        if active_href.as_deref() == Some(href.as_str()) {
            add_class(Some(link), "active");
        } else {
            remove_class(Some(link), "active");
        }
    }
}

fn init_navigation(
    els: &Rc<PageElements>,
    state: &Rc<RefCell<PageState>>,
) -> Result<(), JsValue> {
    let list = els.document.query_selector_all("section[id]")?;
    let mut sections = Vec::new();
    for i in 0..list.length() {
        let Some(el) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let id = el.id();
        sections.push((el, id));
    }
    let sections = Rc::new(sections);

    update_active_nav(els, &sections);

    let els_scroll = Rc::clone(els);
    let sections_scroll = Rc::clone(&sections);
    let on_scroll = Closure::wrap(Box::new(move |_event: Event| {
        update_active_nav(&els_scroll, &sections_scroll);
    }) as Box<dyn FnMut(_)>);
    window().add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
    on_scroll.forget();

    for link in &els.nav_links {
        let els_click = Rc::clone(els);
        let state_click = Rc::clone(state);
        let link_click = link.clone();
        let on_click = Closure::wrap(Box::new(move |event: Event| {
            let Some(href) = link_click.get_attribute("href") else {
                return;
            };
            if !href.starts_with('#') {
                return;
            }
            event.prevent_default();

            let Ok(Some(target)) = els_click.document.query_selector(&href) else {
                return;
            };

            {
                let mut state = state_click.borrow_mut();
                if state.presentation.theater.is_on() {
                    toggle_theater_mode(&els_click, &mut state);
                }
            }

            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }) as Box<dyn FnMut(_)>);
        link.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Mobile share actions
// ---------------------------------------------------------------------------

fn current_page_url() -> String {
    window().location().href().unwrap_or_default()
}

/// Flip the copy button between its default and "copied" face. The glyph
/// lives in the button's span, the label in its trailing text node.
pub fn set_copy_button_copied(button: &HtmlElement, copied: bool) {
    let (glyph, label) = copy_button_labels(copied);
    if let Ok(Some(icon)) = button.query_selector("span") {
        icon.set_text_content(Some(glyph));
    }
    let children = button.child_nodes();
    if children.length() > 0 {
        if let Some(last) = children.item(children.length() - 1) {
            if last.node_type() == Node::TEXT_NODE {
                last.set_text_content(Some(label));
            }
        }
    }
}

fn confirm_copy(els: &PageElements) {
    show_toast(&els.document, "Link copied!");
    if let Some(button) = els.copy_link_btn.as_ref() {
        set_copy_button_copied(button, true);
        let button = button.clone();
        run_after(COPY_RESET_MS, move || {
            set_copy_button_copied(&button, false);
        });
    }
}

/// Selection-and-copy fallback for browsers without the async clipboard.
fn legacy_copy(document: &Document, text: &str) -> bool {
    let Some(body) = document.body() else {
        return false;
    };
    let Some(field) = document
        .create_element("textarea")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
    else {
        return false;
    };
    field.set_value(text);
    let _ = field.set_attribute("style", "position:fixed;left:-9999px;");
    if body.append_child(&field).is_err() {
        return false;
    }
    field.select();
    let copied = document
        .dyn_ref::<HtmlDocument>()
        .and_then(|doc| doc.exec_command("copy").ok())
        .unwrap_or(false);
    let _ = body.remove_child(&field);
    copied
}

fn finish_legacy_copy(els: &PageElements, text: &str) {
    if legacy_copy(&els.document, text) {
        confirm_copy(els);
    } else {
        show_toast(&els.document, "Could not copy link");
    }
}

fn copy_current_link(els: &Rc<PageElements>) {
    let href = current_page_url();
    let nav_js = JsValue::from(window().navigator());

    if Reflect::has(&nav_js, &JsValue::from_str("clipboard")).unwrap_or(false) {
        let els_done = Rc::clone(els);
        spawn_local(async move {
            let promise = window().navigator().clipboard().write_text(&href);
            match JsFuture::from(promise).await {
                Ok(_) => confirm_copy(&els_done),
                Err(_) => finish_legacy_copy(&els_done, &href),
            }
        });
    } else {
        finish_legacy_copy(els, &href);
    }
}

fn init_share_actions(els: &Rc<PageElements>) -> Result<(), JsValue> {
    if let Some(copy_link_btn) = els.copy_link_btn.as_ref() {
        let els_copy = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            copy_current_link(&els_copy);
        }) as Box<dyn FnMut(_)>);
        copy_link_btn
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    if let Some(share_btn) = els.share_btn.as_ref() {
        let els_share = Rc::clone(els);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            let navigator = window().navigator();
            let nav_js = JsValue::from(navigator.clone());
            let has_share = Reflect::has(&nav_js, &JsValue::from_str("share")).unwrap_or(false);

            if !has_share {
                // No share sheet on this platform; the copy button covers it.
                if let Some(copy_link_btn) = els_share.copy_link_btn.as_ref() {
                    copy_link_btn.click();
                }
                return;
            }

            let data = ShareData::new();
            data.set_title(SHARE_TITLE);
            data.set_text(SHARE_TEXT);
            data.set_url(&current_page_url());

            let els_done = Rc::clone(&els_share);
            spawn_local(async move {
                if let Err(err) = JsFuture::from(navigator.share_with_data(&data)).await {
                    // A dismissed share sheet is not an error.
                    if js_error_name(&err).as_deref() != Some("AbortError") {
                        show_toast(&els_done.document, "Could not share");
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        share_btn.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Walkthrough accordion
// ---------------------------------------------------------------------------

pub fn update_accordion_glyph(item: &HtmlDetailsElement) {
    if let Ok(Some(icon)) = item.query_selector(".expand-icon") {
        icon.set_text_content(Some(if item.open() { "\u{2212}" } else { "+" }));
    }
}

fn init_accordion(els: &Rc<PageElements>) -> Result<(), JsValue> {
    let items = els.document.query_selector_all(".walkthrough-item")?;
    for i in 0..items.length() {
        let Some(item) = items
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlDetailsElement>().ok())
        else {
            continue;
        };
        let item_toggle = item.clone();
        let on_toggle = Closure::wrap(Box::new(move |_event: Event| {
            update_accordion_glyph(&item_toggle);
        }) as Box<dyn FnMut(_)>);
        item.add_event_listener_with_callback("toggle", on_toggle.as_ref().unchecked_ref())?;
        on_toggle.forget();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Embed hints
// ---------------------------------------------------------------------------

fn init_performance_hints(els: &PageElements) {
    if let Some(iframe) = els.game_iframe.as_ref() {
        let _ = iframe.set_attribute("loading", "lazy");
    }

    let Some(head) = els.document.head() else {
        return;
    };
    for rel in ["preconnect", "dns-prefetch"] {
        let Ok(link) = els.document.create_element("link") else {
            continue;
        };
        let _ = link.set_attribute("rel", rel);
        let _ = link.set_attribute("href", EMBED_ORIGIN);
        let _ = head.append_child(&link);
    }
}

fn init_ios_handling(els: &PageElements) {
    let user_agent = window().navigator().user_agent().unwrap_or_default();
    if !is_ios_device(&user_agent) {
        return;
    }

    // iOS does not support the standard fullscreen API on arbitrary elements.
    if let Some(fullscreen_btn) = els.fullscreen_btn.as_ref() {
        fullscreen_btn.set_title("Fullscreen (limited on iOS)");
    }
    if let Some(body) = els.document.body() {
        let _ = body.class_list().add_1("is-ios");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn report_init_failure(err: &JsValue) {
    web_sys::console::error_1(&JsValue::from_str(&format!(
        "site init failed: {}",
        js_value_to_string(err)
    )));
}

fn start_impl() -> Result<(), JsValue> {
    let win = window();
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;

    let els = Rc::new(PageElements::lookup(&document));
    let state = Rc::new(RefCell::new(PageState::new()));

    install_toast_keyframes(&document);
    init_loading_gate(&els, &state)?;
    init_device_branch(&els, &state)?;
    init_play_overlay(&els)?;
    init_game_controls(&els, &state)?;
    init_help_modal(&els)?;
    init_keyboard_shortcuts(&els, &state)?;
    init_navigation(&els, &state)?;
    init_share_actions(&els)?;
    init_accordion(&els)?;
    init_performance_hints(&els);
    init_ios_handling(&els);

    web_sys::console::log_1(&JsValue::from_str("Sheriff Looper site initialized"));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if document.ready_state() == DocumentReadyState::Loading {
        let on_ready = Closure::wrap(Box::new(move || {
            if let Err(err) = start_impl() {
                report_init_failure(&err);
            }
        }) as Box<dyn FnMut()>);
        let _ = document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        );
        on_ready.forget();
    } else if let Err(err) = start_impl() {
        report_init_failure(&err);
    }
}
