//! Scriptable in-process engine for bridge tests.
//!
//! Implements the same C ABI the real engine exposes, backed by statics:
//! a file-backed history store, an interrupt flag, and scripted read-line
//! results. Ownership crosses through `malloc`/`free` exactly as it would
//! with the production engine, so the transfer protocol is tested for
//! real.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

use crate::core::bridge;
use crate::spi::engine::{
    CompletionCallback, Engine, EngineVtable, FreeHintsCallback, HintsCallback, RawCompletions,
};

/// One scripted outcome for `mock_read_line`, consumed front to back.
pub(crate) enum ScriptedRead {
    Line(&'static str),
    Eof,
    Interrupt,
}

static INTERRUPT_FLAG: AtomicI32 = AtomicI32::new(0);
static MULTILINE: AtomicBool = AtomicBool::new(false);
static SCRIPT: Mutex<Vec<ScriptedRead>> = Mutex::new(Vec::new());
static HISTORY: Mutex<Vec<String>> = Mutex::new(Vec::new());
static MAX_LEN: Mutex<usize> = Mutex::new(100);
static COMPLETION_CB: Mutex<Option<CompletionCallback>> = Mutex::new(None);
static HINTS_CB: Mutex<Option<HintsCallback>> = Mutex::new(None);
static FREE_HINTS_CB: Mutex<Option<FreeHintsCallback>> = Mutex::new(None);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Engine ABI implementation
// ---------------------------------------------------------------------------

/// Take ownership of a string argument the way the engine would: copy it
/// out, then release the malloc buffer.
unsafe fn consume_arg(ptr: *const c_char) -> String {
    let text = unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() };
    unsafe { libc::free(ptr.cast_mut().cast::<c_void>()) };
    text
}

unsafe extern "C" fn mock_read_line(prompt: *const c_char) -> *mut c_char {
    if !prompt.is_null() {
        let _prompt = unsafe { consume_arg(prompt) };
    }
    let next = {
        let mut script = lock(&SCRIPT);
        if script.is_empty() {
            None
        } else {
            Some(script.remove(0))
        }
    };
    match next {
        Some(ScriptedRead::Line(line)) => {
            let line = CString::new(line).unwrap();
            unsafe { libc::strdup(line.as_ptr()) }
        }
        Some(ScriptedRead::Interrupt) => {
            INTERRUPT_FLAG.store(1, Ordering::SeqCst);
            std::ptr::null_mut()
        }
        Some(ScriptedRead::Eof) | None => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn mock_free_line(ptr: *mut c_void) {
    unsafe { libc::free(ptr) };
}

unsafe extern "C" fn mock_add_completion(lc: *mut RawCompletions, text: *mut c_char) {
    unsafe {
        let lc = &mut *lc;
        let grown = libc::realloc(
            lc.cvec.cast::<c_void>(),
            (lc.len + 1) * std::mem::size_of::<*mut c_char>(),
        )
        .cast::<*mut c_char>();
        assert!(!grown.is_null());
        *grown.add(lc.len) = text;
        lc.cvec = grown;
        lc.len += 1;
    }
}

unsafe extern "C" fn mock_set_completion_callback(callback: CompletionCallback) {
    *lock(&COMPLETION_CB) = Some(callback);
}

unsafe extern "C" fn mock_set_hints_callback(callback: HintsCallback) {
    *lock(&HINTS_CB) = Some(callback);
}

unsafe extern "C" fn mock_set_free_hints_callback(callback: FreeHintsCallback) {
    *lock(&FREE_HINTS_CB) = Some(callback);
}

unsafe extern "C" fn mock_history_add(line: *const c_char) -> c_int {
    let text = unsafe { consume_arg(line) };

    let max = *lock(&MAX_LEN);
    let mut history = lock(&HISTORY);
    if history.last() == Some(&text) {
        return 0;
    }
    history.push(text);
    while history.len() > max {
        history.remove(0);
    }
    1
}

unsafe extern "C" fn mock_history_set_max_len(len: c_int) -> c_int {
    if len < 1 {
        return 0;
    }
    let max = len as usize;
    *lock(&MAX_LEN) = max;
    let mut history = lock(&HISTORY);
    while history.len() > max {
        history.remove(0);
    }
    1
}

unsafe extern "C" fn mock_history_save(path: *const c_char) -> c_int {
    let path = unsafe { consume_arg(path) };
    let mut contents = lock(&HISTORY).join("\n");
    contents.push('\n');
    match std::fs::write(path, contents) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

unsafe extern "C" fn mock_history_load(path: *const c_char) -> c_int {
    let path = unsafe { consume_arg(path) };
    let Ok(contents) = std::fs::read_to_string(path) else {
        return -1;
    };
    let mut history = lock(&HISTORY);
    for line in contents.lines() {
        if !line.is_empty() {
            history.push(line.to_string());
        }
    }
    0
}

unsafe extern "C" fn mock_clear_screen() {}

unsafe extern "C" fn mock_set_multiline(enabled: c_int) {
    MULTILINE.store(enabled != 0, Ordering::SeqCst);
}

unsafe extern "C" fn mock_print_key_codes() {}

// ---------------------------------------------------------------------------
// Test-facing controls
// ---------------------------------------------------------------------------

pub(crate) fn vtable() -> EngineVtable {
    EngineVtable {
        read_line: mock_read_line,
        free_line: mock_free_line,
        add_completion: mock_add_completion,
        set_completion_callback: mock_set_completion_callback,
        set_hints_callback: mock_set_hints_callback,
        set_free_hints_callback: mock_set_free_hints_callback,
        history_add: mock_history_add,
        history_set_max_len: mock_history_set_max_len,
        history_save: mock_history_save,
        history_load: mock_history_load,
        clear_screen: mock_clear_screen,
        set_multiline: mock_set_multiline,
        print_key_codes: mock_print_key_codes,
        was_interrupted: INTERRUPT_FLAG.as_ptr(),
    }
}

/// Install the mock engine and register the bridges, once per process.
/// Tests share the installed mock; [`reset`] restores scripted state
/// between them.
pub(crate) fn install() -> &'static Engine {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let engine = bridge::install(Engine::from_vtable(vtable()))
            .expect("mock engine must be the first install in the test process");
        bridge::register_bridges(engine);
    });
    bridge::engine().expect("mock engine installed")
}

/// Clear scripted reads, history, max length, and the interrupt flag.
/// Callback registrations persist: they are process-lifetime by design.
pub(crate) fn reset() {
    lock(&SCRIPT).clear();
    lock(&HISTORY).clear();
    *lock(&MAX_LEN) = 100;
    INTERRUPT_FLAG.store(0, Ordering::SeqCst);
    MULTILINE.store(false, Ordering::SeqCst);
}

/// Queue read-line outcomes, consumed in order.
pub(crate) fn script(reads: Vec<ScriptedRead>) {
    *lock(&SCRIPT) = reads;
}

/// Raise the interrupt flag directly, as the engine would on the
/// interrupt key.
pub(crate) fn raise_interrupt() {
    INTERRUPT_FLAG.store(1, Ordering::SeqCst);
}

pub(crate) fn multiline_enabled() -> bool {
    MULTILINE.load(Ordering::SeqCst)
}

pub(crate) fn history_snapshot() -> Vec<String> {
    lock(&HISTORY).clone()
}

/// Drive the registered completion callback the way the engine would on
/// a Tab press, returning the collected candidates.
pub(crate) fn run_completion(buffer: &str) -> Vec<String> {
    let callback = (*lock(&COMPLETION_CB)).expect("completion callback registered");
    let buffer = CString::new(buffer).unwrap();
    let mut raw = RawCompletions {
        len: 0,
        cvec: std::ptr::null_mut(),
    };
    unsafe { callback(buffer.as_ptr(), &mut raw) };

    let mut candidates = Vec::with_capacity(raw.len);
    unsafe {
        for i in 0..raw.len {
            let item = *raw.cvec.add(i);
            candidates.push(CStr::from_ptr(item).to_string_lossy().into_owned());
            libc::free(item.cast::<c_void>());
        }
        libc::free(raw.cvec.cast::<c_void>());
    }
    candidates
}
