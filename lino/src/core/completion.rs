//! Completion side of the callback bridge.
//!
//! The engine calls [`completion_trampoline`] once per completion
//! request; the trampoline copies the input buffer into managed memory
//! and hands it, together with an append-only view of the native
//! candidate list, to the registered closure.

use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock};

use log::error;

use crate::api::Error;
use crate::core::{bridge, transfer};
use crate::spi::engine::{Engine, RawCompletions};

type CompletionFn = dyn Fn(&str, &mut Completions<'_>) + Send + Sync;

static COMPLETION: RwLock<Option<Box<CompletionFn>>> = RwLock::new(None);

/// Register the closure invoked for tab-completion.
///
/// The registration is process-wide and lives until the process exits;
/// the engine keeps calling into it from every subsequent read-line
/// call.
pub fn set_completion_callback<F>(callback: F)
where
    F: Fn(&str, &mut Completions<'_>) + Send + Sync + 'static,
{
    *COMPLETION.write().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(callback));
}

/// Append-only view of the engine-owned completion list.
///
/// Only the completion closure ever sees one, and only for the duration
/// of that invocation; the engine creates and frees the underlying list.
pub struct Completions<'a> {
    raw: *mut RawCompletions,
    engine: &'a Engine,
}

impl Completions<'_> {
    /// Duplicate `candidate` to native ownership and append it.
    ///
    /// The engine's append primitive takes ownership of the copy and
    /// frees it together with the list.
    pub fn add(&mut self, candidate: &str) -> Result<(), Error> {
        let text = CString::new(candidate).map_err(|_| Error::EmbeddedNul)?;
        unsafe {
            (self.engine.vtable().add_completion)(self.raw, transfer::to_native(&text));
        }
        Ok(())
    }
}

/// Entry point the engine calls once per completion request.
///
/// A panic in the registered closure must not unwind across the C
/// boundary; it is caught here and reported as "no candidates". Anything
/// already appended stays owned by the native list, so nothing leaks.
pub(crate) unsafe extern "C" fn completion_trampoline(
    buf: *const c_char,
    lc: *mut RawCompletions,
) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let Ok(engine) = bridge::engine() else {
            return;
        };
        let buffer = if buf.is_null() {
            String::new()
        } else {
            unsafe { transfer::to_managed(buf) }
        };
        let guard = COMPLETION.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(callback) = guard.as_deref() {
            let mut list = Completions { raw: lc, engine };
            callback(&buffer, &mut list);
        }
    }));
    if outcome.is_err() {
        error!("completion callback panicked; no candidates reported");
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::spi::mock;

    #[test]
    #[serial]
    fn test_candidates_appended_in_order() {
        mock::install();
        mock::reset();
        set_completion_callback(|buffer: &str, completions: &mut Completions<'_>| {
            if buffer == "a" {
                completions.add("ab").unwrap();
                completions.add("ac").unwrap();
            }
        });

        assert_eq!(mock::run_completion("a"), vec!["ab", "ac"]);
        assert!(mock::run_completion("b").is_empty());
    }

    #[test]
    #[serial]
    fn test_candidate_with_nul_is_rejected() {
        mock::install();
        mock::reset();
        set_completion_callback(|_: &str, completions: &mut Completions<'_>| {
            assert!(matches!(completions.add("a\0b"), Err(Error::EmbeddedNul)));
        });

        assert!(mock::run_completion("a").is_empty());
    }

    #[test]
    #[serial]
    fn test_panicking_callback_reports_no_candidates() {
        mock::install();
        mock::reset();
        set_completion_callback(|_: &str, _: &mut Completions<'_>| panic!("closure failure"));

        assert!(mock::run_completion("x").is_empty());

        set_completion_callback(|_: &str, _: &mut Completions<'_>| {});
    }
}
