//! Core runtime for canopy: business-component state machines, the tree
//! closure resolver, the cascading selection engine, and the pending-change
//! overlay, with the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod filter;
pub mod obs;
pub mod pending;
pub mod record;
pub mod selection;
pub mod sorter;
pub mod state;
pub mod tree;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Maximum number of selection tags rendered before the remainder collapses
/// into a single synthetic overflow entry.
///
/// The cap is presentation-only; it never limits how many records may be
/// selected.
pub const TAG_DISPLAY_LIMIT: usize = 5;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or internal helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        engine::{Engine, Notice, Outcome},
        filter::{Filter, FilterOp},
        record::{DataSet, Record, RecordId},
        selection::{SelectionPolicies, SelectionTag},
        sorter::{SortDirection, Sorter},
        state::{EntityMeta, EntityState, Event, QueryToken, ScreenState},
        tree::ResolvedTree,
        value::Value,
    };
}
