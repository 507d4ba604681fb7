//! Public types and operations of the lino bridge.

mod error;

pub use error::Error;

pub use crate::core::bridge::{setup, setup_with};
pub use crate::core::completion::{set_completion_callback, Completions};
pub use crate::core::config::BridgeConfig;
pub use crate::core::hints::{set_hints_callback, Hint, HintColor};
pub use crate::core::history::{history_add, history_load, history_save, history_set_max_len};
pub use crate::core::interrupt::catch_break;
pub use crate::core::reader::read_line;
pub use crate::core::terminal::{clear_screen, print_key_codes, set_multiline};
