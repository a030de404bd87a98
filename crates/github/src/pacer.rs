//! Cooperative pacing against the remote search quota.
//!
//! The pacer holds the call counter for an entire run as explicit state,
//! passed into the client rather than living in a global. Pacing is lazy: the
//! sleep happens before the call that would exceed the quota window, so the
//! final call of a run never triggers a trailing sleep.

use std::time::Duration;

/// Call counter plus quota for one run.
#[derive(Debug)]
pub struct Pacer {
    calls_issued: u64,
    quota: u32,
    cooldown: Duration,
}

impl Pacer {
    pub fn new(quota: u32, cooldown: Duration) -> Self {
        Self {
            calls_issued: 0,
            quota: quota.max(1),
            cooldown,
        }
    }

    /// Register the next outgoing call. Returns how long to sleep before
    /// issuing it, if the quota window is exhausted.
    pub fn begin_call(&mut self) -> Option<Duration> {
        let wait = if self.calls_issued > 0 && self.calls_issued % self.quota as u64 == 0 {
            Some(self.cooldown)
        } else {
            None
        };
        self.calls_issued += 1;
        wait
    }

    /// Total calls issued so far in this run, retries included.
    pub fn calls_issued(&self) -> u64 {
        self.calls_issued
    }
}
