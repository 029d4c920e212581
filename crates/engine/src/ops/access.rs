use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, obligations, series};

use super::Engine;

impl Engine {
    /// Looks up an obligation and checks ownership.
    ///
    /// Rows belonging to another user are reported as missing, never as
    /// forbidden, so ids cannot be probed.
    pub(super) async fn require_obligation(
        &self,
        db: &DatabaseTransaction,
        obligation_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<obligations::Model> {
        obligations::Entity::find_by_id(obligation_id.to_string())
            .filter(obligations::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("obligation not exists".to_string()))
    }

    pub(super) async fn require_series(
        &self,
        db: &DatabaseTransaction,
        series_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<series::Model> {
        series::Entity::find_by_id(series_id.to_string())
            .filter(series::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("series not exists".to_string()))
    }
}
