//! Sales-agreement and draft-scenario snapshots.
//!
//! The agreement is the signed (or in-flight) contract baseline that change
//! orders later overlay. Programs and price adjustments are the agreement's
//! own incentive lines; the aggregator folds them into the breakdown.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a sales agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    /// Drafted but not yet sent for signature.
    Pending,
    /// Sent to the buyer for signature.
    OutForSignature,
    /// Signed by the buyer.
    Signed,
    /// Countersigned and approved.
    Approved,
    /// Voided before approval.
    Void,
    /// Closed out.
    Closed,
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::OutForSignature => write!(f, "out_for_signature"),
            Self::Signed => write!(f, "signed"),
            Self::Approved => write!(f, "approved"),
            Self::Void => write!(f, "void"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Kind of sales incentive program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    /// Builder contribution toward the buyer's closing costs.
    BuyersClosingCost,
    /// Flat discount off the sale price.
    DiscountFlatAmount,
}

/// A sales incentive attached to the agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesProgram {
    /// What the program contributes to.
    pub program_type: ProgramType,
    /// Amount in whole currency units.
    pub amount: i64,
}

/// Kind of agreement-level price adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Negotiated discount line.
    Discount,
    /// Closing-cost line (a separate cost line, not a reduction).
    ClosingCost,
}

/// An agreement-level price adjustment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    /// Which aggregate the line lands in.
    pub kind: AdjustmentKind,
    /// Amount in whole currency units.
    pub amount: i64,
}

/// The active sales agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAgreement {
    /// Agreement id; `None` for an agreement not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Lifecycle state.
    pub status: AgreementStatus,
    /// Contracted sale price in whole currency units.
    pub sale_price: i64,
    /// Incentive programs on the agreement.
    #[serde(default)]
    pub programs: Vec<SalesProgram>,
    /// Agreement-level price adjustments.
    #[serde(default)]
    pub price_adjustments: Vec<PriceAdjustment>,
    /// When the buyer signed, if they have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_date: Option<DateTime<Utc>>,
    /// When the agreement was approved, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
}

impl SalesAgreement {
    /// Returns true if the agreement is still `Pending` or has never been
    /// saved. Phase pricing only applies in this window.
    #[must_use]
    pub fn is_pending_or_unsaved(&self) -> bool {
        self.id.is_none() || self.status == AgreementStatus::Pending
    }
}

/// Draft estimates captured before an agreement exists.
///
/// When present, these not-yet-committed figures take precedence over the
/// computed incentive amounts in the price breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioInfo {
    /// Estimated design-selection spend.
    pub design_estimate: i64,
    /// Estimated homesite spend.
    pub homesite_estimate: i64,
    /// Anticipated closing incentive.
    pub closing_incentive: i64,
    /// Anticipated sales-program discount.
    pub discount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agreement(id: Option<u32>, status: AgreementStatus) -> SalesAgreement {
        SalesAgreement {
            id,
            status,
            sale_price: 0,
            programs: Vec::new(),
            price_adjustments: Vec::new(),
            signed_date: None,
            approved_date: None,
        }
    }

    #[test]
    fn pending_or_unsaved_window() {
        assert!(agreement(None, AgreementStatus::Approved).is_pending_or_unsaved());
        assert!(agreement(Some(9), AgreementStatus::Pending).is_pending_or_unsaved());
        assert!(!agreement(Some(9), AgreementStatus::Signed).is_pending_or_unsaved());
        assert!(!agreement(Some(9), AgreementStatus::Approved).is_pending_or_unsaved());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AgreementStatus::OutForSignature).unwrap();
        assert_eq!(json, "\"out_for_signature\"");
    }
}
