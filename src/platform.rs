//! Platform abstraction layer
//!
//! Handles browser/native differences for the wall clock and haptics.

/// Vibration hook signature (returns whether the device accepted the pattern)
pub type VibrateFn = fn(&[u32]) -> bool;

/// Wall clock in Unix milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Vibrate with an on/off pattern through the Vibration API
#[cfg(target_arch = "wasm32")]
pub fn vibrate(pattern: &[u32]) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let steps: js_sys::Array = pattern
        .iter()
        .map(|&ms| wasm_bindgen::JsValue::from(ms))
        .collect();
    window.navigator().vibrate_with_pattern(&steps)
}

/// Native builds have no vibration motor to drive
#[cfg(not(target_arch = "wasm32"))]
pub fn vibrate(pattern: &[u32]) -> bool {
    log::debug!("Haptic pattern {pattern:?}");
    false
}
