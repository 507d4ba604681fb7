//! Hints side of the callback bridge.
//!
//! The engine calls [`hints_trampoline`] while rendering to fetch an
//! inline suggestion for the current buffer. A returned hint string is
//! duplicated to native ownership; the engine releases it later through
//! [`free_hint_buffer`], which is registered with the engine exactly
//! once at setup.

use std::ffi::{c_char, c_int, c_void, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{PoisonError, RwLock};

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::core::transfer;

/// Inline hint rendered after the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    /// Suggestion text, drawn non-editable after the cursor.
    pub text: String,
    /// Foreground color.
    pub color: HintColor,
    /// Render in bold.
    pub bold: bool,
}

/// Hint foreground color.
///
/// Discriminants are the renderer's 0-based color family; the bridge
/// reports `discriminant + 31` to the engine, landing on the ANSI codes
/// 31..=37. The offset is part of the renderer contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl HintColor {
    /// ANSI color code the engine renders with.
    pub fn ansi_code(self) -> i32 {
        self as i32 + 31
    }
}

type HintsFn = dyn Fn(&str) -> Option<Hint> + Send + Sync;

static HINTS: RwLock<Option<Box<HintsFn>>> = RwLock::new(None);

/// Register the closure invoked for inline hints.
///
/// Process-wide; lives until the process exits, like the completion
/// registration.
pub fn set_hints_callback<F>(callback: F)
where
    F: Fn(&str) -> Option<Hint> + Send + Sync + 'static,
{
    *HINTS.write().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(callback));
}

/// Entry point the engine calls to fetch a hint for the current buffer.
///
/// No hint: returns null, writes neither out-param, allocates nothing.
/// A hint: returns a malloc-owned copy of the text and writes the color
/// and bold attributes; the engine frees the copy via
/// [`free_hint_buffer`] after display.
pub(crate) unsafe extern "C" fn hints_trampoline(
    buf: *const c_char,
    color: *mut c_int,
    bold: *mut c_int,
) -> *mut c_char {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let buffer = if buf.is_null() {
            String::new()
        } else {
            unsafe { transfer::to_managed(buf) }
        };
        let guard = HINTS.read().unwrap_or_else(PoisonError::into_inner);
        let hint = guard.as_deref().and_then(|callback| callback(&buffer))?;
        let text = match CString::new(hint.text) {
            Ok(text) => text,
            Err(_) => {
                warn!("hint text contains a NUL byte; hint dropped");
                return None;
            }
        };
        unsafe {
            *color = hint.color.ansi_code();
            *bold = c_int::from(hint.bold);
        }
        Some(transfer::to_native(&text))
    }));
    match outcome {
        Ok(Some(hint)) => hint,
        Ok(None) => ptr::null_mut(),
        Err(_) => {
            error!("hints callback panicked; no hint reported");
            ptr::null_mut()
        }
    }
}

/// Deallocator registered with the engine for hint strings. The strings
/// come from `malloc` in the transfer layer, so plain `free` is the
/// matching release.
pub(crate) unsafe extern "C" fn free_hint_buffer(ptr: *mut c_void) {
    if !ptr.is_null() {
        unsafe { libc::free(ptr) };
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn call_trampoline(buffer: &str) -> (*mut c_char, c_int, c_int) {
        let buf = CString::new(buffer).unwrap();
        let mut color: c_int = -1;
        let mut bold: c_int = -1;
        let hint = unsafe { hints_trampoline(buf.as_ptr(), &mut color, &mut bold) };
        (hint, color, bold)
    }

    #[test]
    fn test_ansi_code_offset() {
        assert_eq!(HintColor::Red.ansi_code(), 31);
        assert_eq!(HintColor::Yellow.ansi_code(), 33);
        assert_eq!(HintColor::White.ansi_code(), 37);
    }

    #[test]
    fn test_color_names_parse_lowercase() {
        #[derive(Deserialize)]
        struct Probe {
            color: HintColor,
        }
        let probe: Probe = toml::from_str("color = \"magenta\"").unwrap();
        assert_eq!(probe.color, HintColor::Magenta);
    }

    #[test]
    #[serial]
    fn test_hint_attributes_are_written() {
        set_hints_callback(|buffer| {
            (buffer == "he").then(|| Hint {
                text: String::from("hint"),
                color: HintColor::Yellow,
                bold: true,
            })
        });

        let (hint, color, bold) = call_trampoline("he");
        assert!(!hint.is_null());
        let text = unsafe { transfer::to_managed(hint) };
        unsafe { free_hint_buffer(hint.cast()) };
        assert_eq!(text, "hint");
        assert_eq!(color, 33);
        assert_eq!(bold, 1);
    }

    #[test]
    #[serial]
    fn test_no_hint_writes_nothing() {
        set_hints_callback(|_| None);

        let (hint, color, bold) = call_trampoline("anything");
        assert!(hint.is_null());
        assert_eq!(color, -1);
        assert_eq!(bold, -1);
    }

    #[test]
    #[serial]
    fn test_panicking_callback_reports_no_hint() {
        set_hints_callback(|_| panic!("closure failure"));

        let (hint, color, _) = call_trampoline("x");
        assert!(hint.is_null());
        assert_eq!(color, -1);
    }
}
