#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlDetailsElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .expect("no window")
        .document()
        .expect("no document")
}

#[wasm_bindgen_test]
fn toast_replaces_any_live_toast() {
    let doc = document();

    sheriff_looper_site::show_toast(&doc, "first");
    sheriff_looper_site::show_toast(&doc, "second");

    let toasts = doc.query_selector_all(".toast").expect("query toasts");
    assert_eq!(toasts.length(), 1);
    let text = toasts
        .item(0)
        .and_then(|n| n.text_content())
        .unwrap_or_default();
    assert_eq!(text, "second");

    // Leave a clean body for the other tests.
    if let Ok(Some(toast)) = doc.query_selector(".toast") {
        toast.remove();
    }
}

#[wasm_bindgen_test]
fn copy_button_face_round_trips() {
    let doc = document();
    let button = doc
        .create_element("button")
        .expect("create button")
        .dyn_into::<HtmlElement>()
        .expect("button element");
    button.set_inner_html("<span>\u{1F4CB}</span> Copy Link");

    sheriff_looper_site::set_copy_button_copied(&button, true);
    let icon = button
        .query_selector("span")
        .expect("query span")
        .expect("span present");
    assert_eq!(icon.text_content().unwrap_or_default(), "\u{2713}");
    assert!(
        button
            .text_content()
            .unwrap_or_default()
            .contains("Copied!")
    );

    sheriff_looper_site::set_copy_button_copied(&button, false);
    assert_eq!(icon.text_content().unwrap_or_default(), "\u{1F4CB}");
    assert!(
        button
            .text_content()
            .unwrap_or_default()
            .contains("Copy Link")
    );
}

#[wasm_bindgen_test]
fn accordion_glyph_follows_open_state() {
    let doc = document();
    let item = doc
        .create_element("details")
        .expect("create details")
        .dyn_into::<HtmlDetailsElement>()
        .expect("details element");
    item.set_inner_html("<summary>Chapter 1 <span class=\"expand-icon\">+</span></summary>");

    item.set_open(true);
    sheriff_looper_site::update_accordion_glyph(&item);
    let icon = item
        .query_selector(".expand-icon")
        .expect("query icon")
        .expect("icon present");
    assert_eq!(icon.text_content().unwrap_or_default(), "\u{2212}");

    item.set_open(false);
    sheriff_looper_site::update_accordion_glyph(&item);
    assert_eq!(icon.text_content().unwrap_or_default(), "+");
}

#[wasm_bindgen_test]
fn glyph_update_tolerates_items_without_an_icon() {
    let doc = document();
    let item = doc
        .create_element("details")
        .expect("create details")
        .dyn_into::<HtmlDetailsElement>()
        .expect("details element");
    item.set_inner_html("<summary>No icon here</summary>");

    item.set_open(true);
    sheriff_looper_site::update_accordion_glyph(&item);
}
