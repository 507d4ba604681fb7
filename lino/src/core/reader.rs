//! One read-line call, end to end.

use std::ffi::{c_void, CString};

use crate::api::Error;
use crate::core::{bridge, interrupt, transfer};

/// Read one line of input, editing under the given prompt.
///
/// Returns `Ok(Some(line))` for submitted input, `Ok(None)` for
/// end-of-input, and [`Error::Interrupted`] when the interrupt key fired
/// while [`catch_break`](crate::catch_break) is enabled. Exactly one of
/// the three occurs per call.
///
/// The engine runs the completion and hints closures synchronously
/// inside this call, on this thread; they must not call `read_line`
/// themselves.
pub fn read_line(prompt: &str) -> Result<Option<String>, Error> {
    let engine = bridge::engine()?;
    let prompt = CString::new(prompt).map_err(|_| Error::EmbeddedNul)?;

    // Fresh flag for this call; a stale interrupt from a previous call
    // must not leak into this one.
    engine.clear_interrupt();

    // The engine consumes the prompt buffer, so it gets its own copy.
    let raw = unsafe { (engine.vtable().read_line)(transfer::to_native(&prompt)) };
    if raw.is_null() {
        // The flag is consulted exactly once, on this exit path.
        return interrupt::null_outcome(engine.interrupted());
    }

    let line = unsafe { transfer::to_managed(raw) };
    unsafe { (engine.vtable().free_line)(raw.cast::<c_void>()) };
    Ok(Some(line))
}
