//! Ledger read endpoint.

use api_types::ledger::{LedgerEntryView, LedgerList, LedgerListResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, obligations::map_direction_back, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<LedgerList>,
) -> Result<Json<LedgerListResponse>, ServerError> {
    let include_voided = payload.include_voided.unwrap_or(false);

    let entries = state
        .engine
        .list_ledger_entries(&user.username, include_voided)
        .await?;

    let entries = entries
        .into_iter()
        .map(|entry| LedgerEntryView {
            id: entry.id,
            direction: map_direction_back(entry.direction),
            amount_minor: entry.amount_minor,
            category_id: entry.category_id,
            account_id: entry.account_id,
            posted_on: entry.posted_on,
            obligation_id: entry.obligation_id,
            voided: entry.is_voided(),
        })
        .collect();

    Ok(Json(LedgerListResponse { entries }))
}
