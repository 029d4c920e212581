use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

/// How far a series-aware edit or delete reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Single,
    Future,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

pub mod obligation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ObligationStatus {
        Pending,
        Paid,
        Cancelled,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ObligationKind {
        Plain,
        Recurring,
        Installment,
    }

    /// Scheduling shape of a new obligation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Schedule {
        #[default]
        Once,
        Recurring {
            cadence: Cadence,
        },
        /// `total` payments, one per month starting at the due date. The
        /// given amount is the grand total, split across the group.
        Installments {
            total: u32,
        },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationNew {
        pub direction: Direction,
        /// Must be > 0. For installments this is the grand total.
        pub amount_minor: i64,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        pub due_date: NaiveDate,
        #[serde(default)]
        pub schedule: Schedule,
        pub card_cycle_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationView {
        pub id: Uuid,
        pub direction: Direction,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        pub due_date: NaiveDate,
        pub status: ObligationStatus,
        pub kind: ObligationKind,
        pub series_id: Option<Uuid>,
        /// 1-based position inside an installment group.
        pub installment_index: Option<u32>,
        pub card_cycle_id: Option<Uuid>,
        pub ledger_entry_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationsCreated {
        pub obligations: Vec<ObligationView>,
    }

    /// Query parameters for listing obligations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ObligationList {
        /// Inclusive due-date lower bound.
        pub from: Option<NaiveDate>,
        /// Exclusive due-date upper bound.
        pub to: Option<NaiveDate>,
        pub direction: Option<Direction>,
        pub status: Option<ObligationStatus>,
        pub kind: Option<ObligationKind>,
        /// Case-insensitive substring match on the description.
        pub search: Option<String>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Soonest → later pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationListResponse {
        pub obligations: Vec<ObligationView>,
        /// Opaque cursor for fetching the next page (later items).
        pub next_cursor: Option<String>,
    }

    /// Field delta for an edit. Absent fields stay untouched.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationUpdate {
        #[serde(default)]
        pub scope: Scope,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        /// Only accepted with `scope = single`.
        pub due_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationDelete {
        #[serde(default)]
        pub scope: Scope,
    }

    /// Ids touched by a series-aware edit or delete.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationsAffected {
        pub ids: Vec<Uuid>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PaymentConfirm {
        /// Overrides the obligation's prefilled account when given.
        pub account_id: Option<Uuid>,
        /// Posting date for the ledger entry; defaults to today.
        pub settled_on: Option<NaiveDate>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerList {
        pub include_voided: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub direction: Direction,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub account_id: Uuid,
        pub posted_on: NaiveDate,
        pub obligation_id: Uuid,
        pub voided: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerListResponse {
        pub entries: Vec<LedgerEntryView>,
    }
}

pub mod series {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SeriesView {
        pub id: Uuid,
        pub cadence: Option<Cadence>,
        pub paused: bool,
        pub total_count: Option<u32>,
    }
}
