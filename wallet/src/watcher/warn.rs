//! Warning de-duplication for the polling loops.

use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

/// Logs warnings, dropping one whose message equals the previous warning.
///
/// Only the last message is remembered: `A, A, B, A` logs `A, B, A`.
/// Messages that render empty are always logged.
#[derive(Default)]
pub struct WarnOnce {
    last: Mutex<String>,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `err` unless it repeats the previous warning. Returns `true`
    /// if it was logged.
    pub fn warn(&self, context: &'static str, err: &dyn Display) -> bool {
        let message = err.to_string();
        if !message.is_empty() {
            let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            if *last == message {
                return false;
            }
            last.clone_from(&message);
        }
        tracing::warn!(context = context, "{message}");
        true
    }
}
