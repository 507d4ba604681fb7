//! Process-wide engine handle and one-time bridge registration.
//!
//! The engine holds raw pointers to our trampolines once registered, so
//! the engine handle and both callback registrations are process-wide
//! state, set up once and never torn down.

use std::sync::OnceLock;

use log::{debug, warn};

use crate::api::Error;
use crate::core::{completion, hints, history, interrupt, terminal};
use crate::core::config::BridgeConfig;
use crate::spi::engine::Engine;

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Fetch the engine; fails before [`setup`] has run.
pub(crate) fn engine() -> Result<&'static Engine, Error> {
    ENGINE.get().ok_or(Error::NotReady)
}

/// Put an engine in place. Exactly one engine per process: a second
/// install is refused rather than risking re-registration.
pub(crate) fn install(engine: Engine) -> Result<&'static Engine, Error> {
    let mut fresh = false;
    let handle = ENGINE.get_or_init(|| {
        fresh = true;
        engine
    });
    if fresh {
        Ok(handle)
    } else {
        Err(Error::AlreadyInitialized)
    }
}

/// Hand the engine our trampolines and the hint deallocator. Called once,
/// before any read-line call; the engine keeps these function pointers
/// for the rest of the process.
pub(crate) fn register_bridges(engine: &Engine) {
    let vt = engine.vtable();
    unsafe {
        (vt.set_completion_callback)(completion::completion_trampoline);
        (vt.set_hints_callback)(hints::hints_trampoline);
        (vt.set_free_hints_callback)(hints::free_hint_buffer);
    }
}

/// Load the engine and register the completion, hints, and free-hints
/// callbacks, using `~/.linorc` (and the `LINO_ENGINE` environment
/// variable) to locate the library.
///
/// Must be called once, before any other engine operation. A second call
/// returns [`Error::AlreadyInitialized`].
pub fn setup() -> Result<(), Error> {
    setup_with(&BridgeConfig::load())
}

/// Like [`setup`], with an explicit configuration.
pub fn setup_with(config: &BridgeConfig) -> Result<(), Error> {
    let path = config.engine_library_path();
    let engine = install(Engine::load(&path)?)?;
    debug!("loaded line-editing engine from {}", path.display());

    register_bridges(engine);
    apply_config(config)?;
    Ok(())
}

/// Push the configured editing behavior into the freshly loaded engine.
fn apply_config(config: &BridgeConfig) -> Result<(), Error> {
    interrupt::catch_break(config.catch_break);
    terminal::set_multiline(config.multiline)?;
    history::history_set_max_len(config.max_history_size)?;

    if let Some(path) = config.history_file.as_ref() {
        if path.exists() {
            if let Err(e) = history::history_load(&path.to_string_lossy()) {
                warn!("failed to load history from {}: {e}", path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::spi::mock;

    #[test]
    #[serial]
    fn test_second_install_is_rejected() {
        mock::install();

        let again = Engine::from_vtable(mock::vtable());
        assert!(matches!(install(again), Err(Error::AlreadyInitialized)));
    }
}
