//! Series endpoints: pause/resume recurrence expansion.

use api_types::series::SeriesView;
use axum::{
    Extension,
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_cadence_back(cadence: engine::Cadence) -> api_types::Cadence {
    match cadence {
        engine::Cadence::Daily => api_types::Cadence::Daily,
        engine::Cadence::Weekly => api_types::Cadence::Weekly,
        engine::Cadence::Monthly => api_types::Cadence::Monthly,
        engine::Cadence::Yearly => api_types::Cadence::Yearly,
    }
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SeriesView>, ServerError> {
    let series = state.engine.series(id, &user.username).await?;
    Ok(Json(SeriesView {
        id: series.id,
        cadence: series.cadence.map(map_cadence_back),
        paused: series.paused,
        total_count: series.total_count,
    }))
}

pub async fn pause(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.pause_recurrence(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resume(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.resume_recurrence(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
