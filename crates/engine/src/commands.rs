//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/edit/confirm),
//! keeping call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Cadence, Direction};

/// Breadth selector for series-aware edit/delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Only the targeted occurrence.
    Single,
    /// The target plus every pending same-series occurrence due on or after
    /// it.
    Future,
}

/// Scheduling shape of a new obligation.
///
/// The three shapes are mutually exclusive by construction; there is no way
/// to ask for an obligation that is both recurring and an installment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    Once,
    Recurring { cadence: Cadence },
    Installments { total: u32 },
}

/// Create a one-time, recurring, or installment obligation.
#[derive(Clone, Debug)]
pub struct CreateObligationCmd {
    pub user_id: String,
    pub direction: Direction,
    pub amount_minor: i64,
    pub due_date: NaiveDate,
    pub schedule: Schedule,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub card_cycle_id: Option<Uuid>,
}

impl CreateObligationCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        direction: Direction,
        amount_minor: i64,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            direction,
            amount_minor,
            due_date,
            schedule: Schedule::Once,
            description: None,
            category_id: None,
            account_id: None,
            card_cycle_id: None,
        }
    }

    #[must_use]
    pub fn recurring(mut self, cadence: Cadence) -> Self {
        self.schedule = Schedule::Recurring { cadence };
        self
    }

    #[must_use]
    pub fn installments(mut self, total: u32) -> Self {
        self.schedule = Schedule::Installments { total };
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn card_cycle_id(mut self, card_cycle_id: Uuid) -> Self {
        self.card_cycle_id = Some(card_cycle_id);
        self
    }
}

/// Edit an obligation, alone or together with its pending future tail.
///
/// Fields left `None` are not touched.
#[derive(Clone, Debug)]
pub struct EditObligationCmd {
    pub obligation_id: Uuid,
    pub user_id: String,
    pub scope: Scope,

    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    /// Only valid with [`Scope::Single`].
    pub due_date: Option<NaiveDate>,
}

impl EditObligationCmd {
    #[must_use]
    pub fn new(obligation_id: Uuid, user_id: impl Into<String>, scope: Scope) -> Self {
        Self {
            obligation_id,
            user_id: user_id.into(),
            scope,
            amount_minor: None,
            description: None,
            category_id: None,
            account_id: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub(crate) fn has_changes(&self) -> bool {
        self.amount_minor.is_some()
            || self.description.is_some()
            || self.category_id.is_some()
            || self.account_id.is_some()
            || self.due_date.is_some()
    }
}

/// Confirm the payment of a pending obligation.
#[derive(Clone, Debug)]
pub struct ConfirmPaymentCmd {
    pub obligation_id: Uuid,
    pub user_id: String,
    /// Account that receives/pays the amount. Required here when the
    /// obligation row has none.
    pub account_id: Option<Uuid>,
    /// Settlement date for the ledger entry; defaults to today, not to the
    /// due date, since bills get paid early or late.
    pub settled_on: Option<NaiveDate>,
}

impl ConfirmPaymentCmd {
    #[must_use]
    pub fn new(obligation_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            obligation_id,
            user_id: user_id.into(),
            account_id: None,
            settled_on: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn settled_on(mut self, settled_on: NaiveDate) -> Self {
        self.settled_on = Some(settled_on);
        self
    }
}
