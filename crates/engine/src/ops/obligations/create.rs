use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Cadence, Classification, CreateObligationCmd, EngineError, Obligation, ObligationStatus,
    ResultEngine, Schedule, Series, SeriesKind, obligations, recurrence, series,
};

use super::super::{Engine, normalize_optional_text, validate_amount, with_tx};

impl Engine {
    /// Creates a scheduled obligation.
    ///
    /// A plain obligation yields one row, a recurring one yields its anchor
    /// occurrence (later occurrences are materialized lazily as earlier
    /// ones get confirmed), and an installment group is pre-generated in
    /// full since the total is fixed at creation. The whole batch is
    /// inserted atomically and returned.
    pub async fn create_obligation(
        &self,
        cmd: CreateObligationCmd,
    ) -> ResultEngine<Vec<Obligation>> {
        validate_amount(cmd.amount_minor)?;
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            match cmd.schedule {
                Schedule::Once => {
                    let obligation = build_obligation(&cmd, description, None, cmd.due_date);
                    insert_all(&db_tx, vec![obligation]).await
                }
                Schedule::Recurring { cadence } => {
                    let series = self
                        .insert_series(&db_tx, &cmd, SeriesKind::Recurrence, Some(cadence), None)
                        .await?;
                    let anchor = build_obligation(
                        &cmd,
                        description,
                        Some(Classification::Recurring {
                            series_id: series.id,
                        }),
                        cmd.due_date,
                    );
                    insert_all(&db_tx, vec![anchor]).await
                }
                Schedule::Installments { total } => {
                    if total < 2 {
                        return Err(EngineError::Validation(
                            "installment total must be >= 2".to_string(),
                        ));
                    }
                    // Every share must stay positive after the split.
                    if cmd.amount_minor < i64::from(total) {
                        return Err(EngineError::Validation(format!(
                            "amount_minor must be >= {total} to split into {total} installments"
                        )));
                    }
                    let series = self
                        .insert_series(
                            &db_tx,
                            &cmd,
                            SeriesKind::Installment,
                            None,
                            Some(total),
                        )
                        .await?;

                    let amounts = split_amount(cmd.amount_minor, total);
                    let mut batch = Vec::with_capacity(total as usize);
                    let mut due = cmd.due_date;
                    for (i, amount_minor) in amounts.into_iter().enumerate() {
                        let index = i as u32 + 1;
                        if index > 1 {
                            due = recurrence::next_occurrence(
                                Cadence::Monthly,
                                due,
                                cmd.due_date,
                            );
                        }
                        let mut occurrence = build_obligation(
                            &cmd,
                            description.clone(),
                            Some(Classification::Installment {
                                series_id: series.id,
                                index,
                            }),
                            due,
                        );
                        occurrence.amount_minor = amount_minor;
                        batch.push(occurrence);
                    }
                    insert_all(&db_tx, batch).await
                }
            }
        })
    }

    async fn insert_series(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CreateObligationCmd,
        kind: SeriesKind,
        cadence: Option<Cadence>,
        total_count: Option<u32>,
    ) -> ResultEngine<Series> {
        let series = Series {
            id: Uuid::new_v4(),
            user_id: cmd.user_id.clone(),
            kind,
            cadence,
            anchor_date: cmd.due_date,
            paused: false,
            total_count,
        };
        series::ActiveModel::from(&series).insert(db_tx).await?;
        Ok(series)
    }
}

fn build_obligation(
    cmd: &CreateObligationCmd,
    description: Option<String>,
    classification: Option<Classification>,
    due_date: NaiveDate,
) -> Obligation {
    Obligation {
        id: Uuid::new_v4(),
        user_id: cmd.user_id.clone(),
        direction: cmd.direction,
        amount_minor: cmd.amount_minor,
        description,
        category_id: cmd.category_id,
        account_id: cmd.account_id,
        due_date,
        status: ObligationStatus::Pending,
        classification: classification.unwrap_or(Classification::Plain),
        card_cycle_id: cmd.card_cycle_id,
        ledger_entry_id: None,
    }
}

async fn insert_all(
    db_tx: &DatabaseTransaction,
    batch: Vec<Obligation>,
) -> ResultEngine<Vec<Obligation>> {
    for obligation in &batch {
        obligations::ActiveModel::from(obligation).insert(db_tx).await?;
    }
    Ok(batch)
}

/// Splits a total into `count` minor-unit amounts that sum back exactly,
/// handing the remainder one unit at a time to the earliest installments.
///
/// Callers must have checked `total_minor >= count`; smaller totals would
/// leave trailing shares at zero.
fn split_amount(total_minor: i64, count: u32) -> Vec<i64> {
    let count = i64::from(count);
    let base = total_minor / count;
    let remainder = total_minor % count;
    (0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
