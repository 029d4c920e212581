//! Obligation primitives.
//!
//! An `Obligation` is a scheduled financial event that has not yet been
//! realized in the ledger: a one-time bill or receivable, one occurrence of
//! a recurring series, or one installment of a fixed group.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    Paid,
    Cancelled,
}

impl ObligationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for ObligationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!("invalid status: {other}"))),
        }
    }
}

/// Series classification of an obligation.
///
/// The three shapes are mutually exclusive by construction: a row is plain,
/// one occurrence of a recurring series, or one installment of a fixed
/// group, never a mix. Rows whose stored columns disagree (an installment
/// index without a series) are rejected at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Classification {
    Plain,
    Recurring { series_id: Uuid },
    Installment { series_id: Uuid, index: u32 },
}

impl Classification {
    pub fn series_id(self) -> Option<Uuid> {
        match self {
            Self::Plain => None,
            Self::Recurring { series_id } | Self::Installment { series_id, .. } => Some(series_id),
        }
    }
}

/// Coarse classification used by list filters and API views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    Plain,
    Recurring,
    Installment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: Uuid,
    pub user_id: String,
    pub direction: Direction,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub due_date: NaiveDate,
    pub status: ObligationStatus,
    pub classification: Classification,
    pub card_cycle_id: Option<Uuid>,
    pub ledger_entry_id: Option<Uuid>,
}

impl Obligation {
    pub fn kind(&self) -> ObligationKind {
        match self.classification {
            Classification::Plain => ObligationKind::Plain,
            Classification::Recurring { .. } => ObligationKind::Recurring,
            Classification::Installment { .. } => ObligationKind::Installment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub direction: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub due_date: Date,
    pub status: String,
    pub series_id: Option<String>,
    pub installment_index: Option<i32>,
    pub card_cycle_id: Option<String>,
    pub ledger_entry_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::series::Entity",
        from = "Column::SeriesId",
        to = "super::series::Column::Id"
    )]
    Series,
}

impl Related<super::series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Series.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Obligation> for ActiveModel {
    fn from(obligation: &Obligation) -> Self {
        let (series_id, installment_index) = match obligation.classification {
            Classification::Plain => (None, None),
            Classification::Recurring { series_id } => (Some(series_id.to_string()), None),
            Classification::Installment { series_id, index } => {
                (Some(series_id.to_string()), Some(index as i32))
            }
        };
        Self {
            id: ActiveValue::Set(obligation.id.to_string()),
            user_id: ActiveValue::Set(obligation.user_id.clone()),
            direction: ActiveValue::Set(obligation.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(obligation.amount_minor),
            description: ActiveValue::Set(obligation.description.clone()),
            category_id: ActiveValue::Set(obligation.category_id.map(|id| id.to_string())),
            account_id: ActiveValue::Set(obligation.account_id.map(|id| id.to_string())),
            due_date: ActiveValue::Set(obligation.due_date),
            status: ActiveValue::Set(obligation.status.as_str().to_string()),
            series_id: ActiveValue::Set(series_id),
            installment_index: ActiveValue::Set(installment_index),
            card_cycle_id: ActiveValue::Set(obligation.card_cycle_id.map(|id| id.to_string())),
            ledger_entry_id: ActiveValue::Set(
                obligation.ledger_entry_id.map(|id| id.to_string()),
            ),
        }
    }
}

impl TryFrom<Model> for Obligation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let classification = classification_from_columns(
            model.series_id.as_deref(),
            model.installment_index,
        )?;
        Ok(Self {
            id: parse_uuid(&model.id, "obligation")?,
            user_id: model.user_id,
            direction: Direction::try_from(model.direction.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
            account_id: parse_optional_uuid(model.account_id.as_deref(), "account")?,
            due_date: model.due_date,
            status: ObligationStatus::try_from(model.status.as_str())?,
            classification,
            card_cycle_id: parse_optional_uuid(model.card_cycle_id.as_deref(), "card cycle")?,
            ledger_entry_id: parse_optional_uuid(
                model.ledger_entry_id.as_deref(),
                "ledger entry",
            )?,
        })
    }
}

fn classification_from_columns(
    series_id: Option<&str>,
    installment_index: Option<i32>,
) -> ResultEngine<Classification> {
    match (series_id, installment_index) {
        (None, None) => Ok(Classification::Plain),
        (Some(series_id), None) => Ok(Classification::Recurring {
            series_id: parse_uuid(series_id, "series")?,
        }),
        (Some(series_id), Some(index)) => {
            if index < 1 {
                return Err(EngineError::SeriesConsistency(format!(
                    "invalid installment index: {index}"
                )));
            }
            Ok(Classification::Installment {
                series_id: parse_uuid(series_id, "series")?,
                index: index as u32,
            })
        }
        (None, Some(_)) => Err(EngineError::SeriesConsistency(
            "installment index without a series".to_string(),
        )),
    }
}

pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    label: &str,
) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}
