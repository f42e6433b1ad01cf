//! SessionActor — Tokio actor owning the authenticated session
//!
//! All session state (current actor, countdown clock, persisted marker)
//! lives inside one task; callers go through a cloneable [`SessionHandle`].
//! Serializing every command and clock tick through one mailbox is what
//! makes the countdown race-free: a renewal and an expiry can never
//! interleave.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hrdesk_access::session::{InMemoryMarkerStore, SessionActor};
//! use hrdesk_access::{AccessConfig, SeededDirectory};
//!
//! #[tokio::main]
//! async fn main() -> hrdesk_access::Result<()> {
//!     let config = AccessConfig::new("/var/lib/hrdesk");
//!     let directory = Arc::new(SeededDirectory::new());
//!     let handle = SessionActor::spawn(
//!         config,
//!         directory.clone(),
//!         directory,
//!         Box::new(InMemoryMarkerStore::new()),
//!     );
//!
//!     // Resolve startup state first; gates block until this has run.
//!     handle.restore_session().await;
//!
//!     let mut events = handle.subscribe();
//!     let ok = handle
//!         .login("dana.whitfield@hrdesk.io".into(), "Adm1n!Desk".into())
//!         .await?;
//!     assert!(ok);
//!
//!     handle.extend_session().await;
//!     println!("{:?}", events.recv().await);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{self, Interval};
use tracing::{debug, info, warn};

use crate::config::AccessConfig;
use crate::directory::{Actor, ActorDirectory, ActorStatus, CredentialStore};
use crate::error::{AccessError, Result};

use super::clock::{ClockPhase, ClockSignal, SessionClock};
use super::marker::{MarkerStore, SessionMarker};
use super::SessionEvent;

// ─── Messages ───

enum SessionMsg {
    Login {
        email: String,
        password: String,
        reply: oneshot::Sender<bool>,
    },
    Logout {
        reply: oneshot::Sender<()>,
    },
    ExtendSession {
        reply: oneshot::Sender<bool>,
    },
    RestoreSession {
        reply: oneshot::Sender<()>,
    },
    CurrentActor {
        reply: oneshot::Sender<Option<Actor>>,
    },
    RemainingSeconds {
        reply: oneshot::Sender<Option<u64>>,
    },
    Phase {
        reply: oneshot::Sender<Option<ClockPhase>>,
    },
}

// ─── Actor ───

struct ActiveSession {
    actor: Actor,
    clock: SessionClock,
}

/// Actor owning authentication state and the session countdown
pub struct SessionActor {
    config: AccessConfig,
    directory: Arc<dyn ActorDirectory>,
    credentials: Arc<dyn CredentialStore>,
    marker: Box<dyn MarkerStore>,
    rx: mpsc::Receiver<SessionMsg>,
    events: broadcast::Sender<SessionEvent>,
    loading_tx: watch::Sender<bool>,
    session: Option<ActiveSession>,
    reset_ticker: bool,
}

impl SessionActor {
    /// Spawn the actor and return a handle to it.
    ///
    /// The handle starts in the loading state; call
    /// [`restore_session`](SessionHandle::restore_session) once at startup
    /// to resolve it.
    pub fn spawn(
        config: AccessConfig,
        directory: Arc<dyn ActorDirectory>,
        credentials: Arc<dyn CredentialStore>,
        marker: Box<dyn MarkerStore>,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::channel(config.command_capacity.max(1));
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (loading_tx, loading_rx) = watch::channel(true);

        let actor = Self {
            config,
            directory,
            credentials,
            marker,
            rx,
            events: events.clone(),
            loading_tx,
            session: None,
            reset_ticker: false,
        };
        tokio::spawn(actor.run());
        info!("SessionActor spawned");

        SessionHandle {
            tx,
            events,
            loading: loading_rx,
        }
    }

    async fn run(mut self) {
        let mut ticker: Option<Interval> = None;

        loop {
            let msg = match ticker.as_mut() {
                Some(interval) => {
                    tokio::select! {
                        // Pending ticks drain before commands so remaining
                        // time tracks the wall clock under load.
                        biased;
                        _ = interval.tick() => None,
                        maybe = self.rx.recv() => match maybe {
                            Some(msg) => Some(msg),
                            None => break,
                        },
                    }
                }
                None => match self.rx.recv().await {
                    Some(msg) => Some(msg),
                    None => break,
                },
            };

            match msg {
                Some(msg) => self.handle_msg(msg).await,
                None => self.handle_tick(),
            }

            if self.reset_ticker {
                ticker = None;
                self.reset_ticker = false;
            }
            match (&ticker, self.session.is_some()) {
                (None, true) => {
                    let period = self.config.tick_interval();
                    // First tick one full period out, not immediately.
                    ticker = Some(time::interval_at(time::Instant::now() + period, period));
                }
                (Some(_), false) => ticker = None,
                _ => {}
            }
        }

        info!("SessionActor stopped");
    }

    async fn handle_msg(&mut self, msg: SessionMsg) {
        match msg {
            SessionMsg::Login { email, password, reply } => {
                let _ = reply.send(self.handle_login(&email, &password).await);
            }
            SessionMsg::Logout { reply } => {
                self.handle_logout();
                let _ = reply.send(());
            }
            SessionMsg::ExtendSession { reply } => {
                let _ = reply.send(self.handle_extend());
            }
            SessionMsg::RestoreSession { reply } => {
                self.handle_restore();
                let _ = reply.send(());
            }
            SessionMsg::CurrentActor { reply } => {
                let _ = reply.send(self.session.as_ref().map(|s| s.actor.clone()));
            }
            SessionMsg::RemainingSeconds { reply } => {
                let _ = reply.send(self.session.as_ref().map(|s| s.clock.remaining_secs()));
            }
            SessionMsg::Phase { reply } => {
                let _ = reply.send(self.session.as_ref().map(|s| s.clock.phase()));
            }
        }
    }

    // ─── Command handlers ───

    async fn handle_login(&mut self, email: &str, password: &str) -> bool {
        let actor = match self.credentials.verify(email, password).await {
            Some(actor) if actor.status == ActorStatus::Active => actor,
            Some(actor) => {
                // Cause detail stays at debug; callers see the uniform failure.
                debug!(actor_id = %actor.id, status = %actor.status, "login attempt on non-active account");
                return Self::reject_login();
            }
            None => return Self::reject_login(),
        };

        let ttl = self.config.session_ttl_secs.max(1);
        let mut clock = SessionClock::start(ttl);
        if let Err(e) = self.marker.save(&SessionMarker::begin(&actor.id, ttl)) {
            warn!(error = %e, "failed to persist session marker");
        }
        info!(actor_id = %actor.id, role = %actor.role, ttl_secs = ttl, "login successful");

        if let Some(signal) = clock.evaluate() {
            self.broadcast(signal);
        }
        self.session = Some(ActiveSession { actor, clock });
        self.reset_ticker = true;
        let _ = self.loading_tx.send(false);
        true
    }

    /// The single rejection path: callers cannot tell an unknown email, a
    /// wrong password, and a non-active account apart.
    fn reject_login() -> bool {
        warn!(reason = %AccessError::InvalidCredentials, "login rejected");
        false
    }

    fn handle_logout(&mut self) {
        if let Some(session) = self.session.as_ref() {
            info!(actor_id = %session.actor.id, "logout");
        }
        self.clear_session();
        let _ = self.loading_tx.send(false);
    }

    fn handle_extend(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("extend ignored: no active session");
            return false;
        };
        if !session.clock.renew() {
            debug!("extend ignored: countdown already expired");
            return false;
        }

        let marker = SessionMarker::begin(&session.actor.id, session.clock.ttl_secs());
        let actor_id = session.actor.id.clone();
        if let Err(e) = self.marker.save(&marker) {
            warn!(error = %e, "failed to persist session marker");
        }
        info!(actor_id = %actor_id, "session extended");
        let _ = self.events.send(SessionEvent::Extended);
        true
    }

    fn handle_restore(&mut self) {
        // Restore only resolves the initial loading state; once a login or
        // logout has settled things, a late restore must not clobber them.
        if !*self.loading_tx.borrow() {
            debug!("restore ignored: session state already resolved");
            return;
        }

        match self.marker.load() {
            Ok(Some(marker)) => {
                let remaining = marker.remaining_secs(Utc::now());
                if remaining == 0 {
                    info!(actor_id = %marker.actor_id, "persisted session already expired");
                    self.discard_marker();
                } else {
                    match self.directory.find_by_id(&marker.actor_id) {
                        Some(actor) if actor.status == ActorStatus::Active => {
                            let mut clock = SessionClock::resume(remaining, marker.ttl_secs);
                            info!(
                                actor_id = %actor.id,
                                remaining_secs = remaining,
                                phase = %clock.phase(),
                                "session restored"
                            );
                            if let Some(signal) = clock.evaluate() {
                                self.broadcast(signal);
                            }
                            self.session = Some(ActiveSession { actor, clock });
                        }
                        _ => {
                            warn!(actor_id = %marker.actor_id, "persisted session references unavailable actor");
                            self.discard_marker();
                        }
                    }
                }
            }
            Ok(None) => debug!("no persisted session marker"),
            Err(e) => warn!(error = %e, "failed to read session marker"),
        }

        let _ = self.loading_tx.send(false);
    }

    // ─── Tick handling ───

    fn handle_tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(signal) = session.clock.tick() else {
            return;
        };
        match signal {
            ClockSignal::Expired => {
                info!(actor_id = %session.actor.id, "session expired");
                self.broadcast(ClockSignal::Expired);
                self.clear_session();
            }
            other => self.broadcast(other),
        }
    }

    fn broadcast(&self, signal: ClockSignal) {
        let event = match signal {
            ClockSignal::Warning { remaining_secs } => SessionEvent::Warning { remaining_secs },
            ClockSignal::Critical { remaining_secs } => SessionEvent::Critical { remaining_secs },
            ClockSignal::Expired => SessionEvent::Expired,
        };
        let _ = self.events.send(event);
    }

    fn clear_session(&mut self) {
        self.session = None;
        self.discard_marker();
    }

    fn discard_marker(&mut self) {
        if let Err(e) = self.marker.clear() {
            warn!(error = %e, "failed to clear session marker");
        }
    }
}

// ─── Handle ───

/// Cloneable handle to the [`SessionActor`]
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionMsg>,
    events: broadcast::Sender<SessionEvent>,
    loading: watch::Receiver<bool>,
}

impl SessionHandle {
    /// Attempt to establish a session.
    ///
    /// Returns `Ok(false)` on any credential failure; the failure surface
    /// never says which part was wrong. Session state is untouched on
    /// failure.
    pub async fn login(&self, email: String, password: String) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionMsg::Login { email, password, reply })
            .await
            .map_err(|_| AccessError::ActorUnavailable("SessionActor".to_string()))?;
        rx.await
            .map_err(|_| AccessError::ActorUnavailable("SessionActor dropped reply".to_string()))
    }

    /// End the session, clearing identity, countdown, and marker.
    /// Idempotent; calling while signed out does nothing.
    pub async fn logout(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(SessionMsg::Logout { reply }).await.is_err() {
            return;
        }
        let _ = rx.await;
    }

    /// Renew the session at the full TTL. Returns `false` (quietly, never
    /// an error) when there is no session left to renew.
    pub async fn extend_session(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(SessionMsg::ExtendSession { reply }).await.is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Resolve startup state from the persisted marker: resume the session
    /// mid-countdown if one is still live, land signed out otherwise.
    /// No-op once the session state is already resolved.
    pub async fn restore_session(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(SessionMsg::RestoreSession { reply }).await.is_err() {
            return;
        }
        let _ = rx.await;
    }

    pub async fn current_actor(&self) -> Option<Actor> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SessionMsg::CurrentActor { reply }).await.ok()?;
        rx.await.ok()?
    }

    pub async fn remaining_seconds(&self) -> Option<u64> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SessionMsg::RemainingSeconds { reply }).await.ok()?;
        rx.await.ok()?
    }

    pub async fn phase(&self) -> Option<ClockPhase> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SessionMsg::Phase { reply }).await.ok()?;
        rx.await.ok()?
    }

    /// Subscribe to lifecycle events. Only events sent after the call are
    /// received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether startup session state is still unresolved
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Wait until startup session state is resolved. Protected rendering
    /// must not run before this completes.
    pub async fn await_ready(&self) {
        let mut loading = self.loading.clone();
        let _ = loading.wait_for(|loading| !loading).await;
    }
}
