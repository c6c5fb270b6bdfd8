//! Job snapshot: the as-built record for a sold home.
//!
//! The engine only reads the job's non-standard options, which seed the
//! baseline that change-order deltas adjust.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::id_newtype;

id_newtype!(
    /// Identifier of a non-standard option.
    NonStandardOptionId
);

/// An ad-hoc priced line item outside the standard catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonStandardOption {
    /// Option identity.
    pub id: NonStandardOptionId,
    /// Description of the one-off work.
    pub description: String,
    /// Unit price in whole currency units.
    pub unit_price: i64,
    /// Quantity ordered.
    pub quantity: u32,
}

impl NonStandardOption {
    /// Extended price of this option (`unit_price × quantity`).
    #[must_use]
    pub const fn extended_price(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// The job record for a sold configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    /// Job id.
    pub id: u32,
    /// Non-standard options already on the job.
    #[serde(default)]
    pub non_standard_options: Vec<NonStandardOption>,
}
