//! Observability boundary.
//!
//! Engine logic MUST NOT depend on a concrete logger; all instrumentation
//! flows through [`EngineEvent`] and [`EventSink`]. Hosts install a sink to
//! observe transitions; with no sink installed, events are dropped.

use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK: RefCell<Option<Rc<dyn EventSink>>> = const { RefCell::new(None) };
}

///
/// EngineEvent
///

#[derive(Clone, Debug)]
pub enum EngineEvent {
    FetchBegin {
        entity: String,
        depth: u32,
    },
    FetchFinish {
        entity: String,
        depth: u32,
        ok: bool,
        records: usize,
    },
    StaleResponseDropped {
        entity: String,
        depth: u32,
    },
    SelectionCascade {
        entity: String,
        ops: usize,
    },
    PendingCleared {
        entities: usize,
        committed: bool,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: &EngineEvent);
}

/// Install a sink for the current thread, replacing any previous one.
pub fn set_sink(sink: Rc<dyn EventSink>) {
    SINK.with_borrow_mut(|slot| *slot = Some(sink));
}

/// Remove the current thread's sink.
pub fn clear_sink() {
    SINK.with_borrow_mut(|slot| *slot = None);
}

/// Emit an event to the installed sink, if any.
pub(crate) fn emit(event: &EngineEvent) {
    SINK.with_borrow(|slot| {
        if let Some(sink) = slot {
            sink.record(event);
        }
    });
}

///
/// MemorySink
///
/// Buffering sink for tests and diagnostics surfaces.
///

#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<EngineEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &EngineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
