use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener};

mod ledger;
mod obligations;
mod payments;
mod series;
mod server;
mod user;

pub mod types {
    pub mod obligation {
        pub use api_types::obligation::{
            ObligationDelete, ObligationList, ObligationListResponse, ObligationNew,
            ObligationUpdate, ObligationView, ObligationsAffected, ObligationsCreated, Schedule,
        };
        pub use engine::Obligation;
    }

    pub mod payment {
        pub use api_types::payment::PaymentConfirm;
    }

    pub mod ledger {
        pub use api_types::ledger::{LedgerEntryView, LedgerList, LedgerListResponse};
    }

    pub mod series {
        pub use api_types::series::SeriesView;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::CardGoverned(_) | EngineError::InvalidTransition(_) => StatusCode::CONFLICT,
        EngineError::Validation(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::SeriesConsistency(_)
        | EngineError::Ledger(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::SeriesConsistency(msg) => {
            tracing::error!("series consistency violation: {msg}");
            "internal server error".to_string()
        }
        EngineError::Ledger(msg) => {
            tracing::error!("ledger error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
