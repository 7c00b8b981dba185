// Native tests for the page controller's pure decision logic. These avoid
// wasm/browser APIs so they run under `cargo test` on the host.

use sheriff_looper_site::{
    MOBILE_BREAKPOINT_PX, Mode, SectionSpan, ShortcutAction, copy_button_labels, is_ios_device,
    is_mobile_device, loading_delay_ms, section_at, shortcut_for,
};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";
const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
    (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

#[test]
fn desktop_stays_desktop_above_the_breakpoint() {
    for width in [MOBILE_BREAKPOINT_PX + 1.0, 1024.0, 1920.0, 3840.0] {
        assert!(
            !is_mobile_device(DESKTOP_UA, width, false),
            "width {} misclassified as mobile",
            width
        );
    }
}

#[test]
fn touch_alone_does_not_make_a_wide_viewport_mobile() {
    assert!(!is_mobile_device(DESKTOP_UA, 1280.0, true));
}

#[test]
fn narrow_touch_viewport_is_mobile() {
    assert!(is_mobile_device(DESKTOP_UA, MOBILE_BREAKPOINT_PX, true));
    assert!(is_mobile_device(DESKTOP_UA, 390.0, true));
}

#[test]
fn mobile_user_agents_match_regardless_of_viewport() {
    assert!(is_mobile_device(ANDROID_UA, 1920.0, false));
    assert!(is_mobile_device(IPHONE_UA, 2560.0, false));
}

#[test]
fn ios_detection_is_specific_to_apple_devices() {
    assert!(is_ios_device(IPHONE_UA));
    assert!(!is_ios_device(ANDROID_UA));
    assert!(!is_ios_device(DESKTOP_UA));
}

#[test]
fn late_load_event_still_respects_minimum_display_time() {
    // Load fired 50ms in; the reveal must wait out the remaining 250ms.
    assert_eq!(loading_delay_ms(300.0, 50.0), 250);
}

#[test]
fn slow_loads_reveal_immediately() {
    assert_eq!(loading_delay_ms(300.0, 300.0), 0);
    assert_eq!(loading_delay_ms(300.0, 1200.0), 0);
}

#[test]
fn letter_shortcuts_yield_to_browser_combos() {
    for key in ["f", "t", "m", "F", "T", "M"] {
        assert_eq!(shortcut_for(key, true, false), None);
        assert_eq!(shortcut_for(key, false, true), None);
    }
}

#[test]
fn plain_letter_shortcuts_map_to_their_toggles() {
    for key in ["f", "F"] {
        assert_eq!(
            shortcut_for(key, false, false),
            Some(ShortcutAction::ToggleFullscreen)
        );
    }
    for key in ["t", "T"] {
        assert_eq!(
            shortcut_for(key, false, false),
            Some(ShortcutAction::ToggleTheater)
        );
    }
    for key in ["m", "M"] {
        assert_eq!(
            shortcut_for(key, false, false),
            Some(ShortcutAction::ToggleSound)
        );
    }
}

#[test]
fn escape_always_dismisses() {
    assert_eq!(
        shortcut_for("Escape", false, false),
        Some(ShortcutAction::DismissOverlays)
    );
    assert_eq!(
        shortcut_for("Escape", true, true),
        Some(ShortcutAction::DismissOverlays)
    );
}

#[test]
fn unmapped_keys_do_nothing() {
    for key in ["x", "Enter", "ArrowDown", " "] {
        assert_eq!(shortcut_for(key, false, false), None);
    }
}

#[test]
fn at_most_one_section_matches_a_scroll_position() {
    let spans = [
        SectionSpan {
            top: 0.0,
            height: 600.0,
        },
        SectionSpan {
            top: 600.0,
            height: 400.0,
        },
        SectionSpan {
            top: 1000.0,
            height: 800.0,
        },
    ];

    assert_eq!(section_at(0.0, &spans), Some(0));
    assert_eq!(section_at(599.0, &spans), Some(0));
    assert_eq!(section_at(600.0, &spans), Some(1));
    assert_eq!(section_at(1700.0, &spans), Some(2));
    assert_eq!(section_at(1800.0, &spans), None);
}

#[test]
fn gaps_between_sections_match_nothing() {
    let spans = [
        SectionSpan {
            top: 100.0,
            height: 200.0,
        },
        SectionSpan {
            top: 500.0,
            height: 200.0,
        },
    ];
    assert_eq!(section_at(50.0, &spans), None);
    assert_eq!(section_at(350.0, &spans), None);
}

#[test]
fn no_sections_means_no_match() {
    assert_eq!(section_at(250.0, &[]), None);
}

#[test]
fn copy_button_faces_pair_glyph_and_label() {
    assert_eq!(copy_button_labels(true), ("\u{2713}", " Copied!"));
    assert_eq!(copy_button_labels(false), ("\u{1F4CB}", " Copy Link"));
}

#[test]
fn presentation_mode_toggle_round_trips() {
    assert_eq!(Mode::Off.toggled(), Mode::On);
    assert_eq!(Mode::Off.toggled().toggled(), Mode::Off);
    assert!(Mode::On.is_on());
    assert!(!Mode::Off.is_on());
}
