//! Pass-through history operations.
//!
//! The history store lives entirely on the engine side. These wrappers
//! only transfer string ownership and surface the raw status codes; the
//! engine defines what non-zero means and this layer does not interpret
//! it.

use std::ffi::{c_int, CString};

use crate::api::Error;
use crate::core::{bridge, transfer};

/// Append a line to the engine's history ring. Returns the engine's raw
/// status code.
pub fn history_add(line: &str) -> Result<i32, Error> {
    let engine = bridge::engine()?;
    let line = CString::new(line).map_err(|_| Error::EmbeddedNul)?;
    Ok(unsafe { (engine.vtable().history_add)(transfer::to_native(&line)) })
}

/// Resize the history ring. Returns the engine's raw status code.
pub fn history_set_max_len(len: usize) -> Result<i32, Error> {
    let engine = bridge::engine()?;
    let len = c_int::try_from(len).unwrap_or(c_int::MAX);
    Ok(unsafe { (engine.vtable().history_set_max_len)(len) })
}

/// Persist the history ring to `path`; the file format is the engine's.
/// Returns the engine's raw status code.
pub fn history_save(path: &str) -> Result<i32, Error> {
    let engine = bridge::engine()?;
    let path = CString::new(path).map_err(|_| Error::EmbeddedNul)?;
    Ok(unsafe { (engine.vtable().history_save)(transfer::to_native(&path)) })
}

/// Load history entries from `path` into the engine's ring. Returns the
/// engine's raw status code.
pub fn history_load(path: &str) -> Result<i32, Error> {
    let engine = bridge::engine()?;
    let path = CString::new(path).map_err(|_| Error::EmbeddedNul)?;
    Ok(unsafe { (engine.vtable().history_load)(transfer::to_native(&path)) })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serial_test::serial;

    use super::*;
    use crate::spi::mock;

    fn temp_history_file(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lino_{}_{}", test_name, std::process::id()))
    }

    #[test]
    #[serial]
    fn test_history_round_trip() {
        mock::install();
        mock::reset();
        let path = temp_history_file("round_trip");
        let _ = std::fs::remove_file(&path);

        assert_eq!(history_add("x").unwrap(), 1);
        assert_eq!(history_save(&path.to_string_lossy()).unwrap(), 0);

        // Fresh store, then load it back.
        mock::reset();
        assert!(mock::history_snapshot().is_empty());
        assert_eq!(history_load(&path.to_string_lossy()).unwrap(), 0);
        assert_eq!(mock::history_snapshot(), vec!["x"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn test_status_codes_surface_verbatim() {
        mock::install();
        mock::reset();

        assert_eq!(history_add("echo one").unwrap(), 1);
        // The engine refuses a duplicate of the last entry with status 0;
        // the bridge hands that through untouched.
        assert_eq!(history_add("echo one").unwrap(), 0);
    }

    #[test]
    #[serial]
    fn test_max_len_is_applied_by_engine() {
        mock::install();
        mock::reset();

        assert_eq!(history_set_max_len(2).unwrap(), 1);
        history_add("one").unwrap();
        history_add("two").unwrap();
        history_add("three").unwrap();
        assert_eq!(mock::history_snapshot(), vec!["two", "three"]);
    }

    #[test]
    #[serial]
    fn test_load_of_missing_file_reports_engine_status() {
        mock::install();
        mock::reset();
        let path = temp_history_file("missing");
        let _ = std::fs::remove_file(&path);

        assert_eq!(history_load(&path.to_string_lossy()).unwrap(), -1);
    }
}
