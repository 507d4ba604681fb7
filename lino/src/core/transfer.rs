//! String ownership transfer across the engine boundary.
//!
//! Two independent allocators meet here: Rust's and the C library's. No
//! string pointer crosses without being copied into the destination
//! side's memory first.

use std::alloc::{handle_alloc_error, Layout};
use std::ffi::{c_char, CStr};
use std::ptr;

/// Duplicate a managed string into a buffer the engine may `free(3)`.
///
/// The engine releases strings it is handed with the C allocator, so the
/// copy must come from `malloc`, never from `CString::into_raw`.
/// Allocation failure aborts: truncating would corrupt the candidate
/// list or the rendered hint.
pub(crate) fn to_native(s: &CStr) -> *mut c_char {
    let bytes = s.to_bytes_with_nul();
    let buf = unsafe { libc::malloc(bytes.len()) }.cast::<c_char>();
    if buf.is_null() {
        handle_alloc_error(Layout::array::<u8>(bytes.len()).unwrap_or(Layout::new::<u8>()));
    }
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buf, bytes.len());
    }
    buf
}

/// Copy a native string into managed memory.
///
/// The caller keeps responsibility for releasing the native original
/// through the engine's designated free function.
///
/// # Safety
/// `ptr` must point to a valid NUL-terminated string that outlives the
/// call.
pub(crate) unsafe fn to_managed(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{c_void, CString};

    #[test]
    fn test_round_trip_copies_content() {
        let original = CString::new("history | tail").unwrap();
        let native = to_native(&original);
        let managed = unsafe { to_managed(native) };
        unsafe { libc::free(native.cast::<c_void>()) };
        assert_eq!(managed, "history | tail");
    }

    #[test]
    fn test_native_copy_is_independent() {
        let original = CString::new("abc").unwrap();
        let native = to_native(&original);
        assert_ne!(native.cast_const(), original.as_ptr());
        drop(original);
        let managed = unsafe { to_managed(native) };
        unsafe { libc::free(native.cast::<c_void>()) };
        assert_eq!(managed, "abc");
    }

    #[test]
    fn test_invalid_utf8_is_copied_lossily() {
        let bytes: &[u8] = b"caf\xE9\0";
        let managed = unsafe { to_managed(bytes.as_ptr().cast::<c_char>()) };
        assert_eq!(managed, "caf\u{FFFD}");
    }
}
