//! Series primitives.
//!
//! A series row links the occurrences of a recurrence or installment group
//! and carries the state shared by all of them: the cadence and anchor date
//! for recurrences, the fixed total for installment groups, and the paused
//! flag that stops future materialization.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cadence, EngineError, obligations::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Recurrence,
    Installment,
}

impl SeriesKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recurrence => "recurrence",
            Self::Installment => "installment",
        }
    }
}

impl TryFrom<&str> for SeriesKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "recurrence" => Ok(Self::Recurrence),
            "installment" => Ok(Self::Installment),
            other => Err(EngineError::SeriesConsistency(format!(
                "invalid series kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: Uuid,
    pub user_id: String,
    pub kind: SeriesKind,
    pub cadence: Option<Cadence>,
    pub anchor_date: NaiveDate,
    pub paused: bool,
    pub total_count: Option<u32>,
}

impl Series {
    /// Cadence of a recurrence series.
    ///
    /// A recurrence row without a cadence is corrupt storage, not caller
    /// input.
    pub fn recurrence_cadence(&self) -> Result<Cadence, EngineError> {
        match (self.kind, self.cadence) {
            (SeriesKind::Recurrence, Some(cadence)) => Ok(cadence),
            _ => Err(EngineError::SeriesConsistency(
                "recurrence series without a cadence".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub cadence: Option<String>,
    pub anchor_date: Date,
    pub paused: bool,
    pub total_count: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Series> for ActiveModel {
    fn from(series: &Series) -> Self {
        Self {
            id: ActiveValue::Set(series.id.to_string()),
            user_id: ActiveValue::Set(series.user_id.clone()),
            kind: ActiveValue::Set(series.kind.as_str().to_string()),
            cadence: ActiveValue::Set(series.cadence.map(|c| c.as_str().to_string())),
            anchor_date: ActiveValue::Set(series.anchor_date),
            paused: ActiveValue::Set(series.paused),
            total_count: ActiveValue::Set(series.total_count.map(|n| n as i32)),
        }
    }
}

impl TryFrom<Model> for Series {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = SeriesKind::try_from(model.kind.as_str())?;
        let cadence = model
            .cadence
            .as_deref()
            .map(Cadence::try_from)
            .transpose()?;
        if kind == SeriesKind::Recurrence && cadence.is_none() {
            return Err(EngineError::SeriesConsistency(
                "recurrence series without a cadence".to_string(),
            ));
        }
        if kind == SeriesKind::Installment && cadence.is_some() {
            return Err(EngineError::SeriesConsistency(
                "installment series with a cadence".to_string(),
            ));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "series")?,
            user_id: model.user_id,
            kind,
            cadence,
            anchor_date: model.anchor_date,
            paused: model.paused,
            total_count: model.total_count.map(|n| n.max(0) as u32),
        })
    }
}
