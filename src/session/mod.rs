//! Session lifecycle — identity, countdown clock, persisted marker, events
//!
//! The [`SessionActor`] owns all session state behind a message channel;
//! everything else holds a cloneable [`SessionHandle`]. The countdown itself
//! is the pure [`SessionClock`] state machine, persistence goes through the
//! [`MarkerStore`] trait, and UI layers learn about lifecycle changes by
//! subscribing to [`SessionEvent`]s.

pub mod actor;
pub mod clock;
pub mod marker;

pub use actor::{SessionActor, SessionHandle};
pub use clock::{ClockPhase, ClockSignal, SessionClock};
pub use marker::{InMemoryMarkerStore, JsonMarkerFile, MarkerStore, SessionMarker};

use serde::{Deserialize, Serialize};

/// Discrete lifecycle notifications broadcast toward UI subscribers.
///
/// The core only announces; rendering toasts or renewal dialogs is the
/// subscriber's problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Advisory countdown notice (more than 120 s left)
    Warning { remaining_secs: u64 },
    /// Blocking renewal prompt (120 s or less left)
    Critical { remaining_secs: u64 },
    /// The session reached zero and was terminated
    Expired,
    /// A renewal succeeded; the countdown restarted at the full TTL
    Extended,
}
