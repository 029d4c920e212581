use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Obligation, ObligationStatus, ResultEngine, Scope, obligations, series,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Deletes an obligation, alone or together with the pending future
    /// tail of its series.
    ///
    /// Paid and cancelled history stays; installment siblings keep their
    /// original indices (no renumbering). When the deletion empties a
    /// series of occurrences entirely, the series row goes with it.
    /// Returns the deleted ids.
    pub async fn delete_obligation(
        &self,
        obligation_id: Uuid,
        scope: Scope,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let target = self
                .require_obligation(&db_tx, obligation_id, user_id)
                .await?;
            let obligation = Obligation::try_from(target.clone())?;
            if obligation.status != ObligationStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "delete requires a pending obligation, found {}",
                    obligation.status.as_str()
                )));
            }

            let resolved = self.resolve_scope(&db_tx, &target, scope).await?;
            let ids: Vec<String> = resolved.iter().map(|m| m.id.clone()).collect();

            let result = obligations::Entity::delete_many()
                .filter(obligations::Column::Id.is_in(ids.clone()))
                .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != ids.len() as u64 {
                return Err(EngineError::SeriesConsistency(format!(
                    "series delete removed {} of {} rows",
                    result.rows_affected,
                    ids.len()
                )));
            }

            if let Some(series_id) = obligation.classification.series_id() {
                self.drop_series_if_empty(&db_tx, series_id).await?;
            }

            resolved
                .iter()
                .map(|m| crate::obligations::parse_uuid(&m.id, "obligation"))
                .collect()
        })
    }

    /// Removes a series row once no occurrence references it anymore.
    ///
    /// A series with surviving paid history is kept: cancelling one of
    /// those payments must re-open into a still valid series.
    async fn drop_series_if_empty(
        &self,
        db_tx: &DatabaseTransaction,
        series_id: Uuid,
    ) -> ResultEngine<()> {
        let remaining = obligations::Entity::find()
            .filter(obligations::Column::SeriesId.eq(series_id.to_string()))
            .one(db_tx)
            .await?;
        if remaining.is_some() {
            return Ok(());
        }

        series::Entity::delete_by_id(series_id.to_string())
            .exec(db_tx)
            .await?;
        Ok(())
    }
}
