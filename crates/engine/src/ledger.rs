//! Realized ledger entries.
//!
//! A ledger entry is the posted counterpart of a paid obligation. Entries
//! are never updated in place: cancelling a payment sets `voided_at`
//! instead of deleting the row, and a later re-confirmation posts a fresh
//! one.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Direction, EngineError,
    obligations::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub direction: Direction,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub account_id: Uuid,
    pub posted_on: NaiveDate,
    pub obligation_id: Uuid,
    pub voided_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn is_voided(&self) -> bool {
        self.voided_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub direction: String,
    pub amount_minor: i64,
    pub category_id: Option<String>,
    pub account_id: String,
    pub posted_on: Date,
    pub obligation_id: String,
    pub voided_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(entry.user_id.clone()),
            direction: ActiveValue::Set(entry.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            category_id: ActiveValue::Set(entry.category_id.map(|id| id.to_string())),
            account_id: ActiveValue::Set(entry.account_id.to_string()),
            posted_on: ActiveValue::Set(entry.posted_on),
            obligation_id: ActiveValue::Set(entry.obligation_id.to_string()),
            voided_at: ActiveValue::Set(entry.voided_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            user_id: model.user_id,
            direction: Direction::try_from(model.direction.as_str())?,
            amount_minor: model.amount_minor,
            category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            posted_on: model.posted_on,
            obligation_id: parse_uuid(&model.obligation_id, "obligation")?,
            voided_at: model.voided_at,
        })
    }
}
