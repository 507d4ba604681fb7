use std::ffi::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr;

use libloading::Library;

use crate::api::Error;

// ---------------------------------------------------------------------------
// Raw engine ABI — the fixed C surface of the line-editing engine
// ---------------------------------------------------------------------------

/// Native list of completion candidates for the buffer being edited.
///
/// Created, owned, and freed by the engine. The bridge only ever appends
/// to it, and only for the duration of a single completion callback.
#[repr(C)]
pub struct RawCompletions {
    /// Number of candidates currently in `cvec`.
    pub len: usize,
    /// Array of `len` malloc-owned candidate strings.
    pub cvec: *mut *mut c_char,
}

/// Callback the engine invokes to collect completion candidates.
pub type CompletionCallback = unsafe extern "C" fn(*const c_char, *mut RawCompletions);

/// Callback the engine invokes to fetch an inline hint.
///
/// Returns a malloc-owned string (or null for no hint) and writes the
/// color and bold attributes through the out-params.
pub type HintsCallback =
    unsafe extern "C" fn(*const c_char, *mut c_int, *mut c_int) -> *mut c_char;

/// Deallocator the engine uses to release hint strings it was handed.
pub type FreeHintsCallback = unsafe extern "C" fn(*mut c_void);

/// Every engine entry point, resolved to a plain function pointer.
pub struct EngineVtable {
    /// `linenoise`: blocking read-line. Consumes the prompt buffer and
    /// returns a string to be released via `free_line`, or null.
    pub read_line: unsafe extern "C" fn(*const c_char) -> *mut c_char,
    /// `linenoiseFree`: release a string the engine returned.
    pub free_line: unsafe extern "C" fn(*mut c_void),
    /// `linenoiseAddCompletion`: append a candidate, taking ownership.
    pub add_completion: unsafe extern "C" fn(*mut RawCompletions, *mut c_char),
    /// `linenoiseSetCompletionCallback`
    pub set_completion_callback: unsafe extern "C" fn(CompletionCallback),
    /// `linenoiseSetHintsCallback`
    pub set_hints_callback: unsafe extern "C" fn(HintsCallback),
    /// `linenoiseSetFreeHintsCallback`
    pub set_free_hints_callback: unsafe extern "C" fn(FreeHintsCallback),
    /// `linenoiseHistoryAdd`: takes ownership of the line buffer.
    pub history_add: unsafe extern "C" fn(*const c_char) -> c_int,
    /// `linenoiseHistorySetMaxLen`
    pub history_set_max_len: unsafe extern "C" fn(c_int) -> c_int,
    /// `linenoiseHistorySave`: takes ownership of the path buffer.
    pub history_save: unsafe extern "C" fn(*const c_char) -> c_int,
    /// `linenoiseHistoryLoad`: takes ownership of the path buffer.
    pub history_load: unsafe extern "C" fn(*const c_char) -> c_int,
    /// `linenoiseClearScreen`
    pub clear_screen: unsafe extern "C" fn(),
    /// `linenoiseSetMultiLine`
    pub set_multiline: unsafe extern "C" fn(c_int),
    /// `linenoisePrintKeyCodes`
    pub print_key_codes: unsafe extern "C" fn(),
    /// `linenoiseWasInterrupted`: process-wide flag the engine raises
    /// when the interrupt key fires during a read-line call.
    pub was_interrupted: *mut c_int,
}

/// Handle to a loaded engine.
pub struct Engine {
    vtable: EngineVtable,
    // Dropping the library would unmap every function pointer above.
    #[allow(dead_code)]
    lib: Option<Library>,
}

// SAFETY: the engine is single-session by contract. The vtable is
// immutable after load, and `was_interrupted` is only touched inside the
// read-line call sequence on the calling thread.
unsafe impl Send for Engine {}
unsafe impl Sync for Engine {}

impl Engine {
    /// Load the engine shared library and resolve every symbol up front.
    pub fn load(path: &Path) -> Result<Self, Error> {
        unsafe {
            let lib = Library::new(path).map_err(|e| {
                Error::Engine(format!(
                    "failed to load engine library {}: {e}",
                    path.display()
                ))
            })?;

            let vtable = EngineVtable {
                read_line: sym(&lib, b"linenoise\0")?,
                free_line: sym(&lib, b"linenoiseFree\0")?,
                add_completion: sym(&lib, b"linenoiseAddCompletion\0")?,
                set_completion_callback: sym(&lib, b"linenoiseSetCompletionCallback\0")?,
                set_hints_callback: sym(&lib, b"linenoiseSetHintsCallback\0")?,
                set_free_hints_callback: sym(&lib, b"linenoiseSetFreeHintsCallback\0")?,
                history_add: sym(&lib, b"linenoiseHistoryAdd\0")?,
                history_set_max_len: sym(&lib, b"linenoiseHistorySetMaxLen\0")?,
                history_save: sym(&lib, b"linenoiseHistorySave\0")?,
                history_load: sym(&lib, b"linenoiseHistoryLoad\0")?,
                clear_screen: sym(&lib, b"linenoiseClearScreen\0")?,
                set_multiline: sym(&lib, b"linenoiseSetMultiLine\0")?,
                print_key_codes: sym(&lib, b"linenoisePrintKeyCodes\0")?,
                was_interrupted: sym(&lib, b"linenoiseWasInterrupted\0")?,
            };

            Ok(Self {
                vtable,
                lib: Some(lib),
            })
        }
    }

    /// Wrap an already-resolved vtable (no library to keep alive).
    #[cfg(test)]
    pub(crate) fn from_vtable(vtable: EngineVtable) -> Self {
        Self { vtable, lib: None }
    }

    pub(crate) fn vtable(&self) -> &EngineVtable {
        &self.vtable
    }

    /// Reset the interrupt flag ahead of a read-line call.
    pub(crate) fn clear_interrupt(&self) {
        unsafe { ptr::write_volatile(self.vtable.was_interrupted, 0) }
    }

    /// Whether the engine raised the interrupt flag.
    pub(crate) fn interrupted(&self) -> bool {
        unsafe { ptr::read_volatile(self.vtable.was_interrupted) != 0 }
    }
}

/// Resolve one engine symbol, with the symbol name in the error.
unsafe fn sym<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, Error> {
    let symbol = unsafe {
        lib.get::<T>(name).map_err(|e| {
            Error::Engine(format!(
                "missing engine symbol {}: {e}",
                String::from_utf8_lossy(&name[..name.len() - 1])
            ))
        })?
    };
    Ok(*symbol)
}
