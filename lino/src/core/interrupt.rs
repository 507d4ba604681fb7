//! Interrupt handling for read-line calls.
//!
//! The engine raises a process-wide flag when the interrupt key fires
//! mid-edit. The flag is cleared at the start of every read-line call
//! and consulted at most once, on the null-result exit path; whether a
//! raised flag becomes a cancellation is controlled here.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::Error;

static BREAK_ON_INTERRUPT: AtomicBool = AtomicBool::new(false);

/// Choose whether an interrupt during read-line surfaces as
/// [`Error::Interrupted`] or is treated as ordinary end-of-input.
pub fn catch_break(enabled: bool) {
    BREAK_ON_INTERRUPT.store(enabled, Ordering::SeqCst);
}

/// Outcome of a null read-line result: a raised interrupt flag becomes a
/// cancellation only while catch-break is enabled.
pub(crate) fn null_outcome(interrupted: bool) -> Result<Option<String>, Error> {
    if interrupted && BREAK_ON_INTERRUPT.load(Ordering::SeqCst) {
        Err(Error::Interrupted)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_outcome_table() {
        catch_break(false);
        assert!(matches!(null_outcome(false), Ok(None)));
        assert!(matches!(null_outcome(true), Ok(None)));

        catch_break(true);
        assert!(matches!(null_outcome(false), Ok(None)));
        assert!(matches!(null_outcome(true), Err(Error::Interrupted)));

        catch_break(false);
    }
}
