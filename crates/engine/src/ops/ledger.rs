//! The ledger writer contract used by payment confirmation.
//!
//! `post_entry` is idempotent per obligation: at most one live (non-voided)
//! entry can exist for an obligation id, so a retried confirm never posts
//! twice. `void_entry` is the inverse and is itself idempotent.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, LedgerEntry, Obligation, ResultEngine, ledger, obligations::parse_uuid};

use super::{Engine, with_tx};

/// Posts the realized entry for an obligation being confirmed.
///
/// Returns the existing live entry's id when one is already there.
pub(super) async fn post_entry(
    db: &DatabaseTransaction,
    obligation: &Obligation,
    account_id: Uuid,
    posted_on: NaiveDate,
) -> ResultEngine<Uuid> {
    let existing = ledger::Entity::find()
        .filter(ledger::Column::ObligationId.eq(obligation.id.to_string()))
        .filter(ledger::Column::VoidedAt.is_null())
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return parse_uuid(&existing.id, "ledger entry");
    }

    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        user_id: obligation.user_id.clone(),
        direction: obligation.direction,
        amount_minor: obligation.amount_minor,
        category_id: obligation.category_id,
        account_id,
        posted_on,
        obligation_id: obligation.id,
        voided_at: None,
    };
    ledger::ActiveModel::from(&entry).insert(db).await?;
    Ok(entry.id)
}

/// Voids a ledger entry (soft delete). Voiding an already-voided entry is a
/// no-op.
pub(super) async fn void_entry(db: &DatabaseTransaction, entry_id: Uuid) -> ResultEngine<()> {
    let model = ledger::Entity::find_by_id(entry_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::Ledger("linked ledger entry not exists".to_string()))?;
    if model.voided_at.is_some() {
        return Ok(());
    }

    let active = ledger::ActiveModel {
        id: ActiveValue::Set(entry_id.to_string()),
        voided_at: ActiveValue::Set(Some(Utc::now())),
        ..Default::default()
    };
    active.update(db).await?;
    Ok(())
}

impl Engine {
    /// Lists a user's ledger entries, newest posting date first.
    pub async fn list_ledger_entries(
        &self,
        user_id: &str,
        include_voided: bool,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            let mut query = ledger::Entity::find()
                .filter(ledger::Column::UserId.eq(user_id.to_string()));
            if !include_voided {
                query = query.filter(ledger::Column::VoidedAt.is_null());
            }
            let rows = query
                .order_by_desc(ledger::Column::PostedOn)
                .order_by_desc(ledger::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(LedgerEntry::try_from(model)?);
            }
            Ok(out)
        })
    }
}
