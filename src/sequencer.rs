//! Stale-response guard for overlapping user actions.
//!
//! Every asynchronous flow captures an id before it starts and checks it
//! again before each observable effect. Any result whose id is no longer
//! the latest one issued for its flow is dropped without a trace.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Independent families of requests. A new request only supersedes older
/// requests of the same flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Place selection: globe pin, search pick or geolocation.
    Pin,
    /// Globe style and border overlay loading.
    Style,
    /// Forecast fetch and render for the current selection.
    Weather,
    /// Geocoding search result lists.
    Search,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Pin => "pin",
            Flow::Style => "style",
            Flow::Weather => "weather",
            Flow::Search => "search",
        })
    }
}

pub type RequestId = u64;

/// Per-flow monotonic counters.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    pin: AtomicU64,
    style: AtomicU64,
    weather: AtomicU64,
    search: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, flow: Flow) -> &AtomicU64 {
        match flow {
            Flow::Pin => &self.pin,
            Flow::Style => &self.style,
            Flow::Weather => &self.weather,
            Flow::Search => &self.search,
        }
    }

    /// Issues a new id for `flow`, superseding every earlier id of that flow.
    pub fn next_id(&self, flow: Flow) -> RequestId {
        self.counter(flow).fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True iff `id` is still the latest id issued for `flow`.
    pub fn is_current(&self, flow: Flow, id: RequestId) -> bool {
        self.counter(flow).load(Ordering::SeqCst) == id
    }

    /// The latest id issued for `flow` (0 before the first request).
    pub fn latest(&self, flow: Flow) -> RequestId {
        self.counter(flow).load(Ordering::SeqCst)
    }

    /// Issues a new id and captures it together with its flow.
    pub fn issue(&self, flow: Flow) -> RequestTicket {
        RequestTicket {
            flow,
            id: self.next_id(flow),
        }
    }
}

/// A captured `(flow, id)` pair carried through an async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub flow: Flow,
    pub id: RequestId,
}

impl RequestTicket {
    pub fn is_current(&self, sequencer: &RequestSequencer) -> bool {
        sequencer.is_current(self.flow, self.id)
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.flow, self.id)
    }
}
