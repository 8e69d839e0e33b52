//! Session bookkeeping.

use serde::{Deserialize, Serialize};

/// Identifies a game in progress on one server.
///
/// `step` counts answered questions; `last_guess_step` is the step at which
/// the last guess list was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub session: String,
    pub signature: String,
    pub step: u32,
    pub last_guess_step: u32,
}

impl UserSession {
    pub fn new(session: impl Into<String>, signature: impl Into<String>, step: u32) -> Self {
        Self {
            session: session.into(),
            signature: signature.into(),
            step,
            last_guess_step: 0,
        }
    }

    /// True before any question has been answered.
    pub fn at_start(&self) -> bool {
        self.step == 0
    }
}
