//! Payment confirmation endpoints

use api_types::{obligation::ObligationView, payment::PaymentConfirm};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, obligations, server::ServerState, user};

pub async fn confirm(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentConfirm>,
) -> Result<Json<ObligationView>, ServerError> {
    let mut cmd = engine::ConfirmPaymentCmd::new(id, &user.username);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(settled_on) = payload.settled_on {
        cmd = cmd.settled_on(settled_on);
    }

    let obligation = state.engine.confirm_payment(cmd).await?;
    Ok(Json(obligations::view(obligation)))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state.engine.cancel_payment(id, &user.username).await?;
    Ok(Json(obligations::view(obligation)))
}
