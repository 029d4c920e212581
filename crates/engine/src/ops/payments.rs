//! Payment confirmation and cancellation.
//!
//! The state machine is `pending --confirm--> paid --cancel--> pending`.
//! Both transitions run inside a single DB transaction together with the
//! ledger write, and flip the status with a conditional update so that two
//! concurrent calls on the same obligation cannot both succeed.

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Classification, ConfirmPaymentCmd, EngineError, Obligation, ObligationStatus, ResultEngine,
    Series, SeriesKind, obligations, recurrence,
};

use super::{Engine, ledger, with_tx};

impl Engine {
    /// Confirms the payment of a pending obligation.
    ///
    /// Posts the realized ledger entry (amount/direction/category mirror
    /// the obligation; the posting date is the settlement date, not the due
    /// date) and flips the status to paid, all in one transaction.
    ///
    /// Confirming the last pending occurrence of a recurring series
    /// materializes the next occurrence, unless the series is paused.
    /// Installment series never expand.
    pub async fn confirm_payment(&self, cmd: ConfirmPaymentCmd) -> ResultEngine<Obligation> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_obligation(&db_tx, cmd.obligation_id, &cmd.user_id)
                .await?;
            let obligation = Obligation::try_from(model)?;

            if obligation.card_cycle_id.is_some() {
                return Err(EngineError::CardGoverned(
                    "settled in bulk by its card's invoice".to_string(),
                ));
            }
            if obligation.status != ObligationStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "confirm requires a pending obligation, found {}",
                    obligation.status.as_str()
                )));
            }
            let account_id = cmd.account_id.or(obligation.account_id).ok_or_else(|| {
                EngineError::Validation(
                    "account_id is required to confirm a payment".to_string(),
                )
            })?;
            let posted_on = cmd.settled_on.unwrap_or_else(|| Utc::now().date_naive());

            let entry_id = ledger::post_entry(&db_tx, &obligation, account_id, posted_on).await?;

            let result = obligations::Entity::update_many()
                .col_expr(
                    obligations::Column::Status,
                    Expr::value(ObligationStatus::Paid.as_str()),
                )
                .col_expr(
                    obligations::Column::AccountId,
                    Expr::value(account_id.to_string()),
                )
                .col_expr(
                    obligations::Column::LedgerEntryId,
                    Expr::value(entry_id.to_string()),
                )
                .filter(obligations::Column::Id.eq(obligation.id.to_string()))
                .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                // Lost the race: someone else moved the row first.
                return Err(EngineError::InvalidTransition(
                    "obligation is no longer pending".to_string(),
                ));
            }

            if let Classification::Recurring { series_id } = obligation.classification {
                self.materialize_next_occurrence(&db_tx, series_id, &obligation, account_id)
                    .await?;
            }

            let model = self
                .require_obligation(&db_tx, cmd.obligation_id, &cmd.user_id)
                .await?;
            Obligation::try_from(model)
        })
    }

    /// Cancels a payment, re-opening the obligation.
    ///
    /// Voids the linked ledger entry and flips the status back to pending.
    /// The account chosen at confirmation is kept as a prefill for the next
    /// confirm.
    pub async fn cancel_payment(
        &self,
        obligation_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Obligation> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_obligation(&db_tx, obligation_id, user_id)
                .await?;
            let obligation = Obligation::try_from(model)?;

            if obligation.status != ObligationStatus::Paid {
                return Err(EngineError::InvalidTransition(format!(
                    "cancel requires a paid obligation, found {}",
                    obligation.status.as_str()
                )));
            }
            let entry_id = obligation.ledger_entry_id.ok_or_else(|| {
                EngineError::SeriesConsistency(
                    "paid obligation without a ledger entry".to_string(),
                )
            })?;

            ledger::void_entry(&db_tx, entry_id).await?;

            let result = obligations::Entity::update_many()
                .col_expr(
                    obligations::Column::Status,
                    Expr::value(ObligationStatus::Pending.as_str()),
                )
                .col_expr(
                    obligations::Column::LedgerEntryId,
                    Expr::value(Option::<String>::None),
                )
                .filter(obligations::Column::Id.eq(obligation.id.to_string()))
                .filter(obligations::Column::Status.eq(ObligationStatus::Paid.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(EngineError::InvalidTransition(
                    "obligation is no longer paid".to_string(),
                ));
            }

            let model = self
                .require_obligation(&db_tx, obligation_id, user_id)
                .await?;
            Obligation::try_from(model)
        })
    }

    /// Creates the next occurrence of a recurring series when the confirmed
    /// one was the last still pending.
    ///
    /// Idempotent: a series never gets two occurrences with the same due
    /// date, so re-running with the same series state inserts nothing.
    async fn materialize_next_occurrence(
        &self,
        db_tx: &DatabaseTransaction,
        series_id: Uuid,
        confirmed: &Obligation,
        account_id: Uuid,
    ) -> ResultEngine<()> {
        let series_model = self
            .require_series(db_tx, series_id, &confirmed.user_id)
            .await?;
        let series = Series::try_from(series_model)?;
        if series.kind != SeriesKind::Recurrence {
            return Err(EngineError::SeriesConsistency(
                "recurring obligation linked to a non-recurrence series".to_string(),
            ));
        }
        if series.paused {
            return Ok(());
        }

        let later_pending = obligations::Entity::find()
            .filter(obligations::Column::SeriesId.eq(series_id.to_string()))
            .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()))
            .filter(obligations::Column::DueDate.gt(confirmed.due_date))
            .one(db_tx)
            .await?;
        if later_pending.is_some() {
            return Ok(());
        }

        let cadence = series.recurrence_cadence()?;
        let next_due =
            recurrence::next_occurrence(cadence, confirmed.due_date, series.anchor_date);

        let duplicate = obligations::Entity::find()
            .filter(obligations::Column::SeriesId.eq(series_id.to_string()))
            .filter(obligations::Column::DueDate.eq(next_due))
            .one(db_tx)
            .await?;
        if duplicate.is_some() {
            return Ok(());
        }

        let next = Obligation {
            id: Uuid::new_v4(),
            user_id: confirmed.user_id.clone(),
            direction: confirmed.direction,
            amount_minor: confirmed.amount_minor,
            description: confirmed.description.clone(),
            category_id: confirmed.category_id,
            account_id: Some(account_id),
            due_date: next_due,
            status: ObligationStatus::Pending,
            classification: Classification::Recurring { series_id },
            card_cycle_id: None,
            ledger_entry_id: None,
        };
        obligations::ActiveModel::from(&next).insert(db_tx).await?;
        Ok(())
    }

    /// Returns an obligation with ownership checked.
    pub async fn obligation(
        &self,
        obligation_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Obligation> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_obligation(&db_tx, obligation_id, user_id)
                .await?;
            Obligation::try_from(model)
        })
    }
}
