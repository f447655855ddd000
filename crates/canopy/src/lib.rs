//! ## Crate layout
//! - `core`: business-component state machines, tree closure resolver,
//!   cascading selection, filter/sorter registries, and the pending-change
//!   overlay.
//!
//! The `prelude` module mirrors the surface a host shell wires against:
//! build an [`core::engine::Engine`], feed it [`core::state::Event`]s, and
//! read snapshots back.

pub use canopy_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::engine::Engine;

///
/// Host Prelude
///

pub mod prelude {
    pub use crate::core::{
        TAG_DISPLAY_LIMIT,
        engine::{Engine, Notice, Outcome},
        filter::{Filter, FilterOp, FilterScope, parse_filters},
        obs::{EngineEvent, EventSink},
        pending::PendingChanges,
        record::{DataSet, Record, RecordId},
        selection::{SelectionPolicies, SelectionTag},
        sorter::{SortDirection, Sorter, parse_sorters},
        state::{EntityMeta, EntityState, Event, QueryToken, ScreenState},
        tree::{ExpansionState, ResolvedTree},
        value::Value,
    };
    pub use serde::{Deserialize, Serialize};
}
