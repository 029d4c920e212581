use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Classification, EngineError, Obligation, ObligationStatus, ResultEngine, Scope, Series,
    SeriesKind, obligations, series,
};

use super::{Engine, with_tx};

impl Engine {
    /// Resolves the set of rows affected by a scoped edit/delete.
    ///
    /// `Single` is always just the target. `Future` adds every *pending*
    /// same-series occurrence due on or after the target; paid and
    /// cancelled history is never touched. A plain obligation resolves to
    /// itself for either scope.
    pub(super) async fn resolve_scope(
        &self,
        db: &DatabaseTransaction,
        target: &obligations::Model,
        scope: Scope,
    ) -> ResultEngine<Vec<obligations::Model>> {
        let obligation = Obligation::try_from(target.clone())?;
        let Some(series_id) = obligation.classification.series_id() else {
            return Ok(vec![target.clone()]);
        };
        if scope == Scope::Single {
            return Ok(vec![target.clone()]);
        }

        let series_model = self
            .require_series(db, series_id, &obligation.user_id)
            .await?;
        let series = Series::try_from(series_model)?;
        ensure_kind_agreement(&obligation.classification, series.kind)?;

        let rows = obligations::Entity::find()
            .filter(obligations::Column::SeriesId.eq(series_id.to_string()))
            .filter(obligations::Column::UserId.eq(obligation.user_id.clone()))
            .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()))
            .filter(obligations::Column::DueDate.gte(obligation.due_date))
            .order_by_asc(obligations::Column::DueDate)
            .order_by_asc(obligations::Column::Id)
            .all(db)
            .await?;
        Ok(rows)
    }

    /// Stops future-occurrence materialization for a recurring series.
    ///
    /// Existing pending occurrences are untouched; only the expansion that
    /// runs on confirmation is suspended.
    pub async fn pause_recurrence(&self, series_id: Uuid, user_id: &str) -> ResultEngine<()> {
        self.set_series_paused(series_id, user_id, true).await
    }

    /// Restarts future-occurrence materialization for a recurring series.
    pub async fn resume_recurrence(&self, series_id: Uuid, user_id: &str) -> ResultEngine<()> {
        self.set_series_paused(series_id, user_id, false).await
    }

    async fn set_series_paused(
        &self,
        series_id: Uuid,
        user_id: &str,
        paused: bool,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_series(&db_tx, series_id, user_id).await?;
            let series = Series::try_from(model)?;
            if series.kind != SeriesKind::Recurrence {
                return Err(EngineError::Validation(
                    "only recurring series can be paused or resumed".to_string(),
                ));
            }

            let active = series::ActiveModel {
                id: ActiveValue::Set(series_id.to_string()),
                paused: ActiveValue::Set(paused),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Returns a series with ownership checked.
    pub async fn series(&self, series_id: Uuid, user_id: &str) -> ResultEngine<Series> {
        with_tx!(self, |db_tx| {
            let model = self.require_series(&db_tx, series_id, user_id).await?;
            Series::try_from(model)
        })
    }
}

fn ensure_kind_agreement(
    classification: &Classification,
    kind: SeriesKind,
) -> ResultEngine<()> {
    let agrees = matches!(
        (classification, kind),
        (Classification::Recurring { .. }, SeriesKind::Recurrence)
            | (Classification::Installment { .. }, SeriesKind::Installment)
    );
    if !agrees {
        return Err(EngineError::SeriesConsistency(
            "obligation classification disagrees with its series kind".to_string(),
        ));
    }
    Ok(())
}
