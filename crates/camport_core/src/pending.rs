//! Process-wide pending call store.
//!
//! # Responsibility
//! - Hold at most one in-flight capability invocation per session.
//! - Keep that invocation reachable across destruction and recreation of
//!   the component instance that created it.
//!
//! # Invariants
//! - Single-slot per session: callers enforce one-at-a-time invocation by
//!   checking `is_pending` before `put`.
//! - The side-effect state (remembered output location) lives and dies
//!   with its entry; `take` consumes both exactly once.
//! - Storage is keyed by session identity, never by component instance,
//!   so the continuation outlives the instance that created it.

use crate::model::call::{CallState, CapabilityCall};
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Identity of one bridge session.
///
/// A component instance is created with a session id; a recreated instance
/// reuses the same id and thereby observes its predecessor's pending call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One suspended invocation plus its side-effect state.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub call: CapabilityCall,
    pub state: CallState,
    /// Remembered output location, set once the external launch has an
    /// output side-channel and consumed during resumption.
    pub output: Option<PathBuf>,
}

static PENDING_CALLS: Lazy<Mutex<HashMap<SessionId, PendingEntry>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn with_store<T>(operate: impl FnOnce(&mut HashMap<SessionId, PendingEntry>) -> T) -> T {
    let mut store = PENDING_CALLS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    operate(&mut store)
}

/// Stores the pending entry for one session.
///
/// A displaced previous occupant is returned and logged; callers are
/// expected to reject concurrent invocations before reaching this point.
pub fn put(session: &SessionId, entry: PendingEntry) -> Option<PendingEntry> {
    let displaced = with_store(|store| store.insert(session.clone(), entry));
    if let Some(previous) = &displaced {
        warn!(
            "event=pending_slot_displaced module=pending status=unexpected session={} call_id={}",
            session, previous.call.id
        );
    }
    displaced
}

/// Returns the suspension state of the session's pending call, if any.
pub fn peek_state(session: &SessionId) -> Option<CallState> {
    with_store(|store| store.get(session).map(|entry| entry.state))
}

/// Removes and returns the session's pending entry.
pub fn take(session: &SessionId) -> Option<PendingEntry> {
    with_store(|store| store.remove(session))
}

/// Returns whether the session has an in-flight invocation.
pub fn is_pending(session: &SessionId) -> bool {
    with_store(|store| store.contains_key(session))
}

#[cfg(test)]
mod tests {
    use super::{is_pending, peek_state, put, take, PendingEntry, SessionId};
    use crate::capability::Capability;
    use crate::model::call::{CallState, CapabilityCall};
    use crate::model::options::PhotoOptions;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn unique_session(label: &str) -> SessionId {
        SessionId::new(format!("test.pending.{label}.{}", Uuid::new_v4()))
    }

    fn entry(state: CallState) -> PendingEntry {
        PendingEntry {
            call: CapabilityCall::new(Capability::PhotoCapture, PhotoOptions::default(), |_| {}),
            state,
            output: None,
        }
    }

    #[test]
    fn put_take_roundtrip_consumes_entry() {
        let session = unique_session("roundtrip");
        assert!(!is_pending(&session));

        let stored = entry(CallState::AwaitingPermission);
        let call_id = stored.call.id;
        assert!(put(&session, stored).is_none());
        assert!(is_pending(&session));
        assert_eq!(peek_state(&session), Some(CallState::AwaitingPermission));

        let taken = take(&session).expect("pending entry");
        assert_eq!(taken.call.id, call_id);
        assert!(!is_pending(&session));
        assert!(take(&session).is_none());
    }

    #[test]
    fn put_reports_displaced_occupant() {
        let session = unique_session("displaced");
        let first = entry(CallState::AwaitingPermission);
        let first_id = first.call.id;
        put(&session, first);

        let displaced = put(&session, entry(CallState::AwaitingExternalResult))
            .expect("previous occupant");
        assert_eq!(displaced.call.id, first_id);

        take(&session);
    }

    #[test]
    fn sessions_are_isolated() {
        let left = unique_session("left");
        let right = unique_session("right");
        put(&left, entry(CallState::AwaitingExternalResult));

        assert!(!is_pending(&right));
        assert_eq!(peek_state(&right), None);

        take(&left);
    }

    #[test]
    fn side_effect_state_travels_with_entry() {
        let session = unique_session("side-effect");
        let mut stored = entry(CallState::AwaitingExternalResult);
        stored.output = Some(PathBuf::from("/virtual/JPEG_1_a.jpg"));
        put(&session, stored);

        let taken = take(&session).expect("pending entry");
        assert_eq!(taken.output, Some(PathBuf::from("/virtual/JPEG_1_a.jpg")));
    }
}
