use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EditObligationCmd, EngineError, Obligation, ObligationStatus, ResultEngine, Scope,
    obligations,
};

use super::super::{Engine, normalize_optional_text, validate_amount, with_tx};

impl Engine {
    /// Applies a field delta to an obligation, alone (`Scope::Single`) or
    /// together with the pending future tail of its series
    /// (`Scope::Future`).
    ///
    /// The update is all-or-nothing across the resolved rows; paid and
    /// cancelled occurrences are never touched. Returns the affected ids.
    pub async fn edit_obligation(&self, cmd: EditObligationCmd) -> ResultEngine<Vec<Uuid>> {
        if !cmd.has_changes() {
            return Err(EngineError::Validation("nothing to update".to_string()));
        }
        if let Some(amount_minor) = cmd.amount_minor {
            validate_amount(amount_minor)?;
        }
        if cmd.due_date.is_some() && cmd.scope == Scope::Future {
            // One absolute date applied to a whole tail would collapse the
            // series onto a single day.
            return Err(EngineError::Validation(
                "due_date can only be edited with scope = single".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let target = self
                .require_obligation(&db_tx, cmd.obligation_id, &cmd.user_id)
                .await?;
            let obligation = Obligation::try_from(target.clone())?;
            if obligation.status != ObligationStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "edit requires a pending obligation, found {}",
                    obligation.status.as_str()
                )));
            }

            let resolved = self.resolve_scope(&db_tx, &target, cmd.scope).await?;
            let ids: Vec<String> = resolved.iter().map(|m| m.id.clone()).collect();

            let mut update = obligations::Entity::update_many()
                .filter(obligations::Column::Id.is_in(ids.clone()))
                .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()));
            if let Some(amount_minor) = cmd.amount_minor {
                update = update.col_expr(
                    obligations::Column::AmountMinor,
                    Expr::value(amount_minor),
                );
            }
            if let Some(description) = cmd.description.as_deref() {
                update = update.col_expr(
                    obligations::Column::Description,
                    Expr::value(normalize_optional_text(Some(description))),
                );
            }
            if let Some(category_id) = cmd.category_id {
                update = update.col_expr(
                    obligations::Column::CategoryId,
                    Expr::value(category_id.to_string()),
                );
            }
            if let Some(account_id) = cmd.account_id {
                update = update.col_expr(
                    obligations::Column::AccountId,
                    Expr::value(account_id.to_string()),
                );
            }
            if let Some(due_date) = cmd.due_date {
                update = update.col_expr(obligations::Column::DueDate, Expr::value(due_date));
            }

            let result = update.exec(&db_tx).await?;
            if result.rows_affected != ids.len() as u64 {
                return Err(EngineError::SeriesConsistency(format!(
                    "series edit touched {} of {} rows",
                    result.rows_affected,
                    ids.len()
                )));
            }

            resolved
                .iter()
                .map(|m| crate::obligations::parse_uuid(&m.id, "obligation"))
                .collect()
        })
    }
}
