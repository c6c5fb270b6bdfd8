//! Error types for snapshot validation.
//!
//! The derivation functions themselves never fail: absent inputs contribute
//! zero, unmatched change-order deletes are no-ops, and unresolvable prices
//! degrade to 0. Errors exist only for callers that want to validate a
//! snapshot's structural invariants before handing it to the engine.

use thiserror::Error;

use crate::tree::{PickType, PointId};

/// Structural invariant violations in an input snapshot.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A tree node carries an empty label.
    #[error("{node} label cannot be empty")]
    EmptyLabel {
        /// Which node level carried the empty label.
        node: &'static str,
    },

    /// A point's selections violate its pick-type cardinality.
    #[error("point {point_id} is {pick_type} but has {selected} selected choices")]
    PickCardinality {
        /// The offending point.
        point_id: PointId,
        /// Its cardinality rule.
        pick_type: PickType,
        /// How many choices carried a positive quantity.
        selected: usize,
    },
}
