//! Obligation API endpoints

use api_types::obligation::{
    ObligationDelete, ObligationKind as ApiKind, ObligationList, ObligationListResponse,
    ObligationNew, ObligationStatus as ApiStatus, ObligationUpdate, ObligationView,
    ObligationsAffected, ObligationsCreated, Schedule as ApiSchedule,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn map_direction(direction: api_types::Direction) -> engine::Direction {
    match direction {
        api_types::Direction::Income => engine::Direction::Income,
        api_types::Direction::Expense => engine::Direction::Expense,
    }
}

pub(crate) fn map_direction_back(direction: engine::Direction) -> api_types::Direction {
    match direction {
        engine::Direction::Income => api_types::Direction::Income,
        engine::Direction::Expense => api_types::Direction::Expense,
    }
}

pub(crate) fn map_cadence(cadence: api_types::Cadence) -> engine::Cadence {
    match cadence {
        api_types::Cadence::Daily => engine::Cadence::Daily,
        api_types::Cadence::Weekly => engine::Cadence::Weekly,
        api_types::Cadence::Monthly => engine::Cadence::Monthly,
        api_types::Cadence::Yearly => engine::Cadence::Yearly,
    }
}

pub(crate) fn map_scope(scope: api_types::Scope) -> engine::Scope {
    match scope {
        api_types::Scope::Single => engine::Scope::Single,
        api_types::Scope::Future => engine::Scope::Future,
    }
}

fn map_status(status: ApiStatus) -> engine::ObligationStatus {
    match status {
        ApiStatus::Pending => engine::ObligationStatus::Pending,
        ApiStatus::Paid => engine::ObligationStatus::Paid,
        ApiStatus::Cancelled => engine::ObligationStatus::Cancelled,
    }
}

fn map_status_back(status: engine::ObligationStatus) -> ApiStatus {
    match status {
        engine::ObligationStatus::Pending => ApiStatus::Pending,
        engine::ObligationStatus::Paid => ApiStatus::Paid,
        engine::ObligationStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn map_kind(kind: ApiKind) -> engine::ObligationKind {
    match kind {
        ApiKind::Plain => engine::ObligationKind::Plain,
        ApiKind::Recurring => engine::ObligationKind::Recurring,
        ApiKind::Installment => engine::ObligationKind::Installment,
    }
}

fn map_kind_back(kind: engine::ObligationKind) -> ApiKind {
    match kind {
        engine::ObligationKind::Plain => ApiKind::Plain,
        engine::ObligationKind::Recurring => ApiKind::Recurring,
        engine::ObligationKind::Installment => ApiKind::Installment,
    }
}

pub(crate) fn view(obligation: engine::Obligation) -> ObligationView {
    let (series_id, installment_index) = match obligation.classification {
        engine::Classification::Plain => (None, None),
        engine::Classification::Recurring { series_id } => (Some(series_id), None),
        engine::Classification::Installment { series_id, index } => {
            (Some(series_id), Some(index))
        }
    };
    let kind = map_kind_back(obligation.kind());
    ObligationView {
        id: obligation.id,
        direction: map_direction_back(obligation.direction),
        amount_minor: obligation.amount_minor,
        description: obligation.description,
        category_id: obligation.category_id,
        account_id: obligation.account_id,
        due_date: obligation.due_date,
        status: map_status_back(obligation.status),
        kind,
        series_id,
        installment_index,
        card_cycle_id: obligation.card_cycle_id,
        ledger_entry_id: obligation.ledger_entry_id,
    }
}

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

/// Page size for listings, capped so a client cannot request the world.
fn page_limit(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ObligationNew>,
) -> Result<(StatusCode, Json<ObligationsCreated>), ServerError> {
    let mut cmd = engine::CreateObligationCmd::new(
        &user.username,
        map_direction(payload.direction),
        payload.amount_minor,
        payload.due_date,
    );
    cmd = match payload.schedule {
        ApiSchedule::Once => cmd,
        ApiSchedule::Recurring { cadence } => cmd.recurring(map_cadence(cadence)),
        ApiSchedule::Installments { total } => cmd.installments(total),
    };
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(card_cycle_id) = payload.card_cycle_id {
        cmd = cmd.card_cycle_id(card_cycle_id);
    }

    let created = state.engine.create_obligation(cmd).await?;
    let obligations = created.into_iter().map(view).collect();

    Ok((StatusCode::CREATED, Json(ObligationsCreated { obligations })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<ObligationList>,
) -> Result<Json<ObligationListResponse>, ServerError> {
    let limit = page_limit(payload.limit);

    let filter = engine::ObligationListFilter {
        from: payload.from,
        to: payload.to,
        direction: payload.direction.map(map_direction),
        status: payload.status.map(map_status),
        kind: payload.kind.map(map_kind),
        search_text: payload.search,
    };

    let (obligations, next_cursor) = state
        .engine
        .list_obligations(&user.username, limit, payload.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(ObligationListResponse {
        obligations: obligations.into_iter().map(view).collect(),
        next_cursor,
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state.engine.obligation(id, &user.username).await?;
    Ok(Json(view(obligation)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ObligationUpdate>,
) -> Result<Json<ObligationsAffected>, ServerError> {
    let mut cmd = engine::EditObligationCmd::new(id, &user.username, map_scope(payload.scope));
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(due_date) = payload.due_date {
        cmd = cmd.due_date(due_date);
    }

    let ids = state.engine.edit_obligation(cmd).await?;
    Ok(Json(ObligationsAffected { ids }))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ObligationDelete>,
) -> Result<Json<ObligationsAffected>, ServerError> {
    let ids = state
        .engine
        .delete_obligation(id, map_scope(payload.scope), &user.username)
        .await?;
    Ok(Json(ObligationsAffected { ids }))
}
