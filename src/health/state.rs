//! Server health state machine.
//!
//! # States
//! - Unknown: discovered, never probed
//! - Healthy: a probe succeeded; returned without further probing
//! - Unhealthy: a probe failed; terminal, the entry is evicted
//!
//! # State Transitions
//! ```text
//! Unknown → Healthy:   probe returned 200
//! Unknown → Unhealthy: probe failed
//! Healthy → Unhealthy: a concurrent probe of the same entry failed
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// Health flag shared between concurrent searches.
#[derive(Debug)]
pub struct AtomicHealth(AtomicU8);

impl AtomicHealth {
    pub fn new() -> Self {
        Self(AtomicU8::new(HealthState::Unknown as u8))
    }

    pub fn get(&self) -> HealthState {
        HealthState::from(self.0.load(Ordering::Acquire))
    }

    pub fn is_healthy(&self) -> bool {
        self.get() == HealthState::Healthy
    }

    /// Record a successful probe.
    ///
    /// Returns false when the entry has already been marked unhealthy, since
    /// Unhealthy is terminal.
    pub fn mark_healthy(&self) -> bool {
        match self.0.compare_exchange(
            HealthState::Unknown as u8,
            HealthState::Healthy as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => HealthState::from(current) == HealthState::Healthy,
        }
    }

    /// Record a failed probe. Returns the previous state.
    pub fn mark_unhealthy(&self) -> HealthState {
        HealthState::from(self.0.swap(HealthState::Unhealthy as u8, Ordering::AcqRel))
    }
}

impl Default for AtomicHealth {
    fn default() -> Self {
        Self::new()
    }
}
