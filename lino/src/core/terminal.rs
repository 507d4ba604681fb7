//! Screen and mode pass-throughs. No strings cross the boundary here,
//! so there are no ownership concerns, only the engine-present check.

use std::ffi::c_int;

use crate::api::Error;
use crate::core::bridge;

/// Clear the screen.
pub fn clear_screen() -> Result<(), Error> {
    let engine = bridge::engine()?;
    unsafe { (engine.vtable().clear_screen)() };
    Ok(())
}

/// Switch between single-line and multi-line editing.
pub fn set_multiline(enabled: bool) -> Result<(), Error> {
    let engine = bridge::engine()?;
    unsafe { (engine.vtable().set_multiline)(c_int::from(enabled)) };
    Ok(())
}

/// Debug helper: echo raw key codes until the engine's quit sequence.
pub fn print_key_codes() -> Result<(), Error> {
    let engine = bridge::engine()?;
    unsafe { (engine.vtable().print_key_codes)() };
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::spi::mock;

    #[test]
    #[serial]
    fn test_multiline_mode_reaches_engine() {
        mock::install();
        mock::reset();

        set_multiline(true).unwrap();
        assert!(mock::multiline_enabled());
        set_multiline(false).unwrap();
        assert!(!mock::multiline_enabled());
    }
}
