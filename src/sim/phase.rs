//! Round phases and real-time deadlines

use serde::{Deserialize, Serialize};

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Player reached the goal
    Won,
    /// Player touched a hazard or was overrun
    Lost,
    /// Round was scored and play continues after a pause
    Scored,
}

/// Shared shape of every title's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Countdown,
    /// A demonstration plays; input is ignored until it ends
    Watching,
    Active,
    Terminal(Outcome),
}

impl Phase {
    /// Terminal and not leaving on its own: waits for `restart()`
    pub fn is_final(&self) -> bool {
        matches!(self, Phase::Terminal(Outcome::Won | Outcome::Lost))
    }
}

/// A delay that starts counting on the first tick that polls it
///
/// Games are constructed before the clock delivers its first timestamp, so
/// deadlines are armed lazily instead of at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    delay_ms: f64,
    armed_at: Option<f64>,
}

impl Deadline {
    pub const fn after(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            armed_at: None,
        }
    }

    /// Arm on first call; true once `delay_ms` have passed since arming
    pub fn poll(&mut self, now: f64) -> bool {
        match self.armed_at {
            None => {
                self.armed_at = Some(now);
                self.delay_ms <= 0.0
            }
            Some(at) => now - at >= self.delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_arms_on_first_poll() {
        let mut d = Deadline::after(1000.0);
        assert!(!d.poll(5000.0));
        assert!(!d.poll(5999.0));
        assert!(d.poll(6000.0));
        assert!(d.poll(6500.0), "stays fired");
    }

    #[test]
    fn test_zero_deadline_fires_immediately() {
        let mut d = Deadline::after(0.0);
        assert!(d.poll(42.0));
    }

    #[test]
    fn test_final_phases() {
        assert!(Phase::Terminal(Outcome::Lost).is_final());
        assert!(Phase::Terminal(Outcome::Won).is_final());
        assert!(!Phase::Terminal(Outcome::Scored).is_final());
        assert!(!Phase::Active.is_final());
        assert!(!Phase::Watching.is_final());
    }
}
