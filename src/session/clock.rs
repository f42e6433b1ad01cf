//! Session countdown clock
//!
//! A pure state machine: no timers, no I/O, no wall clock. Something else
//! (the session actor) calls [`tick`](SessionClock::tick) once per elapsed
//! second and forwards whatever signal comes back. Keeping the machine pure
//! makes the countdown fully deterministic under test.
//!
//! Warning thresholds are edge-triggered. Each fires at most once per
//! countdown; a renewal re-arms all of them. When a single evaluation
//! crosses several thresholds at once (resuming mid-countdown), they
//! collapse into one signal for the lowest threshold crossed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Remaining-seconds marks at which warning signals fire, highest first.
/// The highest doubles as the Running/Warning phase boundary.
const WARNING_THRESHOLDS: [u64; 4] = [300, 180, 120, 60];

/// Thresholds at or below this escalate from advisory to blocking
const CRITICAL_CUTOFF_SECS: u64 = 120;

/// Where the countdown currently stands, derived from remaining seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockPhase {
    /// More than the highest warning threshold remains
    Running,
    /// At or below the highest warning threshold, above zero
    Warning,
    /// Zero remains; terminal for this countdown
    Expired,
}

impl ClockPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockPhase::Running => "running",
            ClockPhase::Warning => "warning",
            ClockPhase::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ClockPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge-triggered signal from the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// Advisory notice above the critical cutoff
    Warning { remaining_secs: u64 },
    /// Blocking renewal prompt at or below the critical cutoff
    Critical { remaining_secs: u64 },
    /// The countdown reached zero
    Expired,
}

/// Countdown state for one session
#[derive(Debug, Clone)]
pub struct SessionClock {
    ttl_secs: u64,
    remaining_secs: u64,
    armed: BTreeSet<u64>,
    expiry_armed: bool,
}

impl SessionClock {
    /// Start a fresh countdown at the full TTL with every threshold armed.
    ///
    /// Call [`evaluate`](Self::evaluate) right after: a TTL at or below a
    /// threshold is born past it and owes that signal.
    pub fn start(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            remaining_secs: ttl_secs,
            armed: WARNING_THRESHOLDS.into_iter().collect(),
            expiry_armed: true,
        }
    }

    /// Restore a countdown mid-flight, clamped to the TTL. Thresholds start
    /// armed, so the first [`evaluate`](Self::evaluate) collapses everything
    /// already crossed into a single signal.
    pub fn resume(remaining_secs: u64, ttl_secs: u64) -> Self {
        let mut clock = Self::start(ttl_secs);
        clock.remaining_secs = remaining_secs.min(ttl_secs);
        clock
    }

    /// Advance the countdown by one second.
    ///
    /// Clamped at zero: a tick that finds the countdown already expired is
    /// a no-op and never re-fires the expiry signal.
    pub fn tick(&mut self) -> Option<ClockSignal> {
        if self.remaining_secs == 0 {
            return None;
        }
        self.remaining_secs -= 1;
        self.evaluate()
    }

    /// Disarm every threshold the current position has crossed and report
    /// at most one signal for it.
    pub fn evaluate(&mut self) -> Option<ClockSignal> {
        if self.remaining_secs == 0 {
            if self.expiry_armed {
                self.expiry_armed = false;
                self.armed.clear();
                return Some(ClockSignal::Expired);
            }
            return None;
        }

        let remaining = self.remaining_secs;
        let crossed: Vec<u64> = self.armed.iter().copied().filter(|t| remaining <= *t).collect();
        let &lowest = crossed.first()?;
        self.armed.retain(|t| remaining > *t);

        if lowest <= CRITICAL_CUTOFF_SECS {
            Some(ClockSignal::Critical { remaining_secs: remaining })
        } else {
            Some(ClockSignal::Warning { remaining_secs: remaining })
        }
    }

    /// Reset the countdown to the full TTL and re-arm every threshold.
    ///
    /// Returns `false` without touching anything once expired; an expired
    /// countdown cannot be revived.
    pub fn renew(&mut self) -> bool {
        if self.remaining_secs == 0 {
            return false;
        }
        self.remaining_secs = self.ttl_secs;
        self.armed = WARNING_THRESHOLDS.into_iter().collect();
        self.expiry_armed = true;
        true
    }

    pub fn phase(&self) -> ClockPhase {
        match self.remaining_secs {
            0 => ClockPhase::Expired,
            r if r <= WARNING_THRESHOLDS[0] => ClockPhase::Warning,
            _ => ClockPhase::Running,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `ticks` ticks and collect every signal fired
    fn run_ticks(clock: &mut SessionClock, ticks: u64) -> Vec<ClockSignal> {
        (0..ticks).filter_map(|_| clock.tick()).collect()
    }

    #[test]
    fn test_full_countdown_fires_each_threshold_once() {
        let mut clock = SessionClock::start(300);
        let mut signals = Vec::new();

        // Born exactly on the 300 mark.
        signals.extend(clock.evaluate());
        assert_eq!(clock.phase(), ClockPhase::Warning);

        signals.extend(run_ticks(&mut clock, 300));
        assert_eq!(clock.remaining_secs(), 0);
        assert_eq!(clock.phase(), ClockPhase::Expired);

        assert_eq!(
            signals,
            vec![
                ClockSignal::Warning { remaining_secs: 300 },
                ClockSignal::Warning { remaining_secs: 180 },
                ClockSignal::Critical { remaining_secs: 120 },
                ClockSignal::Critical { remaining_secs: 60 },
                ClockSignal::Expired,
            ]
        );
    }

    #[test]
    fn test_tick_at_zero_is_noop() {
        let mut clock = SessionClock::start(1);
        assert_eq!(clock.evaluate(), Some(ClockSignal::Critical { remaining_secs: 1 }));
        assert_eq!(clock.tick(), Some(ClockSignal::Expired));

        for _ in 0..5 {
            assert_eq!(clock.tick(), None);
        }
        assert_eq!(clock.remaining_secs(), 0);
    }

    #[test]
    fn test_long_ttl_starts_running_and_stays_quiet() {
        let mut clock = SessionClock::start(1800);
        assert_eq!(clock.evaluate(), None);
        assert_eq!(clock.phase(), ClockPhase::Running);

        // Nothing fires until the first threshold.
        assert!(run_ticks(&mut clock, 1499).is_empty());
        assert_eq!(clock.tick(), Some(ClockSignal::Warning { remaining_secs: 300 }));
    }

    #[test]
    fn test_resume_collapses_crossed_thresholds_into_one_signal() {
        let mut clock = SessionClock::resume(45, 300);
        assert_eq!(clock.evaluate(), Some(ClockSignal::Critical { remaining_secs: 45 }));
        assert_eq!(clock.phase(), ClockPhase::Warning);

        // All four thresholds were disarmed together; only expiry is left.
        let signals = run_ticks(&mut clock, 45);
        assert_eq!(signals, vec![ClockSignal::Expired]);
    }

    #[test]
    fn test_resume_above_all_thresholds_is_silent() {
        let mut clock = SessionClock::resume(900, 1800);
        assert_eq!(clock.evaluate(), None);
        assert_eq!(clock.phase(), ClockPhase::Running);
        assert_eq!(clock.remaining_secs(), 900);
    }

    #[test]
    fn test_resume_clamps_to_ttl() {
        let clock = SessionClock::resume(5000, 300);
        assert_eq!(clock.remaining_secs(), 300);
    }

    #[test]
    fn test_renew_rearms_thresholds() {
        let mut clock = SessionClock::start(400);
        clock.evaluate();
        let before = run_ticks(&mut clock, 310);
        assert_eq!(clock.remaining_secs(), 90);
        assert_eq!(
            before,
            vec![
                ClockSignal::Warning { remaining_secs: 300 },
                ClockSignal::Warning { remaining_secs: 180 },
                ClockSignal::Critical { remaining_secs: 120 },
            ]
        );

        assert!(clock.renew());
        assert_eq!(clock.remaining_secs(), 400);
        assert_eq!(clock.phase(), ClockPhase::Running);

        // The same thresholds fire again on the next pass.
        let after = run_ticks(&mut clock, 340);
        assert_eq!(clock.remaining_secs(), 60);
        assert_eq!(
            after,
            vec![
                ClockSignal::Warning { remaining_secs: 300 },
                ClockSignal::Warning { remaining_secs: 180 },
                ClockSignal::Critical { remaining_secs: 120 },
                ClockSignal::Critical { remaining_secs: 60 },
            ]
        );
    }

    #[test]
    fn test_renew_rejected_after_expiry() {
        let mut clock = SessionClock::start(2);
        clock.evaluate();
        run_ticks(&mut clock, 2);
        assert_eq!(clock.phase(), ClockPhase::Expired);

        assert!(!clock.renew());
        assert_eq!(clock.remaining_secs(), 0);
        assert_eq!(clock.phase(), ClockPhase::Expired);
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(SessionClock::resume(301, 1800).phase(), ClockPhase::Running);
        assert_eq!(SessionClock::resume(300, 1800).phase(), ClockPhase::Warning);
        assert_eq!(SessionClock::resume(1, 1800).phase(), ClockPhase::Warning);
        assert_eq!(SessionClock::resume(0, 1800).phase(), ClockPhase::Expired);
    }
}
