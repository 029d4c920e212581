pub use commands::{
    ConfirmPaymentCmd, CreateObligationCmd, EditObligationCmd, Schedule, Scope,
};
pub use error::EngineError;
pub use ledger::LedgerEntry;
pub use obligations::{
    Classification, Direction, Obligation, ObligationKind, ObligationStatus,
};
pub use ops::{Engine, EngineBuilder, ObligationListFilter};
pub use recurrence::{Cadence, next_occurrence};
pub use series::{Series, SeriesKind};

mod commands;
mod error;
mod ledger;
mod obligations;
mod ops;
mod recurrence;
mod series;

type ResultEngine<T> = Result<T, EngineError>;
