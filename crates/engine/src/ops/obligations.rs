mod create;
mod delete;
mod edit;
mod list;

pub use list::ObligationListFilter;
