use dashmap::DashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    LoadSettings,
    SaveSettings,
    LoadHistory,
    LoadConditions,
    Ticktock,
    OverrideSync,
    LastCheck,
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestKind::LoadSettings => "load settings",
            RequestKind::SaveSettings => "save settings",
            RequestKind::LoadHistory => "load history",
            RequestKind::LoadConditions => "load conditions",
            RequestKind::Ticktock => "ticktock",
            RequestKind::OverrideSync => "override sync",
            RequestKind::LastCheck => "last check",
        };
        f.write_str(name)
    }
}

/// Counts requests in flight per kind.
///
/// Overlapping requests are allowed unless the caller asks for an exclusive
/// slot; either way they show up in the logs.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    in_flight: Arc<DashMap<RequestKind, usize>>,
}

/// Marks a request as in flight until dropped.
#[derive(Debug)]
pub struct RequestTicket {
    kind: RequestKind,
    ts: Instant,
    in_flight: Arc<DashMap<RequestKind, usize>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, kind: RequestKind) -> RequestTicket {
        let mut count = self.in_flight.entry(kind).or_insert(0);
        if *count > 0 {
            warn!("Starting {kind} while {} more in flight", *count);
        }
        *count += 1;
        drop(count);
        self.ticket(kind)
    }

    /// Like [`begin`](Self::begin), but returns `None` if a request of the same kind is in flight.
    pub fn try_begin_exclusive(&self, kind: RequestKind) -> Option<RequestTicket> {
        let mut count = self.in_flight.entry(kind).or_insert(0);
        if *count > 0 {
            debug!("Refusing {kind}: {} already in flight", *count);
            return None;
        }
        *count += 1;
        drop(count);
        Some(self.ticket(kind))
    }

    pub fn in_flight(&self, kind: RequestKind) -> usize {
        self.in_flight.get(&kind).map(|c| *c).unwrap_or(0)
    }

    fn ticket(&self, kind: RequestKind) -> RequestTicket {
        RequestTicket {
            kind,
            ts: Instant::now(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl Drop for RequestTicket {
    fn drop(&mut self) {
        if let Some(mut count) = self.in_flight.get_mut(&self.kind) {
            *count = count.saturating_sub(1);
        }
        debug!("{} completed in {:?}", self.kind, self.ts.elapsed());
    }
}
