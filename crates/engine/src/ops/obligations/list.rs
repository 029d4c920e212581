use base64::Engine as _;
use chrono::NaiveDate;
use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, EngineError, Obligation, ObligationKind, ObligationStatus, ResultEngine,
    obligations,
};

use super::super::{Engine, normalize_optional_text, with_tx};

/// Filters for listing obligations.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both against
/// the due date.
#[derive(Clone, Debug, Default)]
pub struct ObligationListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub direction: Option<Direction>,
    pub status: Option<ObligationStatus>,
    pub kind: Option<ObligationKind>,
    /// Case-insensitive substring match against the description.
    pub search_text: Option<String>,
}

fn validate_list_filter(filter: &ObligationListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyObligationFilters: QueryFilter + Sized {
    fn apply_obligation_filters(self, filter: &ObligationListFilter) -> Self;
}

impl<T> ApplyObligationFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_obligation_filters(mut self, filter: &ObligationListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(obligations::Column::DueDate.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(obligations::Column::DueDate.lt(to));
        }
        if let Some(direction) = filter.direction {
            self = self.filter(obligations::Column::Direction.eq(direction.as_str()));
        }
        if let Some(status) = filter.status {
            self = self.filter(obligations::Column::Status.eq(status.as_str()));
        }
        self = match filter.kind {
            Some(ObligationKind::Plain) => self.filter(obligations::Column::SeriesId.is_null()),
            Some(ObligationKind::Recurring) => self
                .filter(obligations::Column::SeriesId.is_not_null())
                .filter(obligations::Column::InstallmentIndex.is_null()),
            Some(ObligationKind::Installment) => {
                self.filter(obligations::Column::InstallmentIndex.is_not_null())
            }
            None => self,
        };
        if let Some(text) = normalize_optional_text(filter.search_text.as_deref()) {
            let needle = format!("%{}%", text.to_lowercase());
            self = self.filter(Expr::cust("LOWER(description)").like(needle));
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ObligationsCursor {
    due_date: NaiveDate,
    obligation_id: String,
}

impl ObligationsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid obligations cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid obligations cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid obligations cursor".to_string()))
    }
}

impl Engine {
    /// Lists a user's obligations with cursor-based pagination.
    ///
    /// Pagination is soonest → later by `(due_date ASC, id ASC)`; a
    /// schedule reads forward, unlike a transaction history.
    pub async fn list_obligations(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &ObligationListFilter,
    ) -> ResultEngine<(Vec<Obligation>, Option<String>)> {
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            let limit_plus_one = limit.saturating_add(1);
            let mut query = obligations::Entity::find()
                .filter(obligations::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(obligations::Column::DueDate)
                .order_by_asc(obligations::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = ObligationsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(obligations::Column::DueDate.gt(cursor.due_date))
                        .add(
                            Condition::all()
                                .add(obligations::Column::DueDate.eq(cursor.due_date))
                                .add(obligations::Column::Id.gt(cursor.obligation_id)),
                        ),
                );
            }
            query = query.apply_obligation_filters(filter);

            let rows: Vec<obligations::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Obligation> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Obligation::try_from(model)?);
            }

            let next_cursor = out.last().map(|obligation| ObligationsCursor {
                due_date: obligation.due_date,
                obligation_id: obligation.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
