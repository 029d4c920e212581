use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Cadence, ConfirmPaymentCmd, CreateObligationCmd, Direction, Engine, EngineError, Obligation,
    ObligationListFilter, ObligationStatus, Scope,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn pending_due_dates(engine: &Engine) -> Vec<NaiveDate> {
    let filter = ObligationListFilter {
        status: Some(ObligationStatus::Pending),
        ..Default::default()
    };
    let (rows, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    rows.into_iter().map(|o| o.due_date).collect()
}

/// The single pending occurrence of the only series under test.
async fn pending_row(engine: &Engine) -> Obligation {
    let filter = ObligationListFilter {
        status: Some(ObligationStatus::Pending),
        ..Default::default()
    };
    let (mut rows, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    rows.remove(0)
}

#[tokio::test]
async fn confirm_marks_paid_and_posts_one_ledger_entry() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 4_500, date(2026, 9, 10))
                .description("electricity bill"),
        )
        .await
        .unwrap();

    let paid = engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id))
        .await
        .unwrap();
    assert_eq!(paid.status, ObligationStatus::Paid);
    assert_eq!(paid.account_id, Some(account_id));
    let entry_id = paid.ledger_entry_id.expect("paid row must link its entry");

    let entries = engine.list_ledger_entries("alice", true).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, entry_id);
    assert_eq!(entries[0].amount_minor, 4_500);
    assert_eq!(entries[0].obligation_id, created[0].id);
    assert!(!entries[0].is_voided());
}

#[tokio::test]
async fn confirm_without_an_account_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();

    let err = engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing was posted.
    let entries = engine.list_ledger_entries("alice", true).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn confirm_prefers_the_command_account_over_the_prefill() {
    let (engine, _db) = engine_with_db().await;
    let prefill = Uuid::new_v4();
    let override_account = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 4_500, date(2026, 9, 10))
                .account_id(prefill),
        )
        .await
        .unwrap();

    let paid = engine
        .confirm_payment(
            ConfirmPaymentCmd::new(created[0].id, "alice").account_id(override_account),
        )
        .await
        .unwrap();
    assert_eq!(paid.account_id, Some(override_account));
}

#[tokio::test]
async fn confirm_uses_the_settlement_date_for_posting() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();

    engine
        .confirm_payment(
            ConfirmPaymentCmd::new(created[0].id, "alice")
                .account_id(Uuid::new_v4())
                .settled_on(date(2026, 9, 14)),
        )
        .await
        .unwrap();

    let entries = engine.list_ledger_entries("alice", false).await.unwrap();
    assert_eq!(entries[0].posted_on, date(2026, 9, 14));
}

#[tokio::test]
async fn double_confirm_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();

    let cmd = ConfirmPaymentCmd::new(created[0].id, "alice").account_id(Uuid::new_v4());
    engine.confirm_payment(cmd.clone()).await.unwrap();
    let err = engine.confirm_payment(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let entries = engine.list_ledger_entries("alice", true).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn concurrent_confirms_let_exactly_one_win() {
    // A single pooled connection keeps the in-memory database shared and
    // forces the two transactions to serialize, like a row lock would.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();
    let cmd = ConfirmPaymentCmd::new(created[0].id, "alice").account_id(Uuid::new_v4());

    let (first, second) = tokio::join!(
        engine.confirm_payment(cmd.clone()),
        engine.confirm_payment(cmd.clone())
    );

    let (oks, errs): (Vec<_>, Vec<_>) =
        [first, second].into_iter().partition(Result::is_ok);
    assert_eq!(oks.len(), 1);
    assert_eq!(errs.len(), 1);
    assert!(matches!(
        errs[0],
        Err(EngineError::InvalidTransition(_))
    ));

    // The loser posted nothing.
    let entries = engine.list_ledger_entries("alice", true).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn card_governed_obligations_cannot_be_confirmed_directly() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 4_500, date(2026, 9, 10))
                .card_cycle_id(Uuid::new_v4()),
        )
        .await
        .unwrap();

    let err = engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CardGoverned(_)));

    // The guard fires before any ledger write.
    let entries = engine.list_ledger_entries("alice", true).await.unwrap();
    assert!(entries.is_empty());

    let reread = engine.obligation(created[0].id, "alice").await.unwrap();
    assert_eq!(reread.status, ObligationStatus::Pending);
}

#[tokio::test]
async fn cancel_voids_the_entry_and_reopens_the_obligation() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();

    engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id))
        .await
        .unwrap();

    let reopened = engine.cancel_payment(created[0].id, "alice").await.unwrap();
    assert_eq!(reopened.status, ObligationStatus::Pending);
    assert_eq!(reopened.ledger_entry_id, None);
    // Account choice survives as a prefill for the next confirm.
    assert_eq!(reopened.account_id, Some(account_id));

    let live = engine.list_ledger_entries("alice", false).await.unwrap();
    assert!(live.is_empty());
    let all = engine.list_ledger_entries("alice", true).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].is_voided());
}

#[tokio::test]
async fn confirm_cancel_confirm_leaves_exactly_one_live_entry() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();
    let cmd = ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id);

    engine.confirm_payment(cmd.clone()).await.unwrap();
    engine.cancel_payment(created[0].id, "alice").await.unwrap();
    engine.confirm_payment(cmd).await.unwrap();

    let live = engine.list_ledger_entries("alice", false).await.unwrap();
    assert_eq!(live.len(), 1);
    let all = engine.list_ledger_entries("alice", true).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn cancel_requires_a_paid_obligation() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            4_500,
            date(2026, 9, 10),
        ))
        .await
        .unwrap();

    let err = engine.cancel_payment(created[0].id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn confirming_a_recurring_occurrence_materializes_the_next() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    // Month-end anchor: the day clamps in short months and recovers later.
    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2024, 1, 31))
                .recurring(Cadence::Monthly),
        )
        .await
        .unwrap();

    engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id))
        .await
        .unwrap();
    assert_eq!(pending_due_dates(&engine).await, vec![date(2024, 2, 29)]);

    let filter = ObligationListFilter {
        status: Some(ObligationStatus::Pending),
        ..Default::default()
    };
    let (pending, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    // The new occurrence inherits amount and the settling account.
    assert_eq!(pending[0].amount_minor, 80_000);
    assert_eq!(pending[0].account_id, Some(account_id));

    engine
        .confirm_payment(ConfirmPaymentCmd::new(pending[0].id, "alice").account_id(account_id))
        .await
        .unwrap();
    assert_eq!(pending_due_dates(&engine).await, vec![date(2024, 3, 31)]);
}

#[tokio::test]
async fn reconfirming_the_anchor_does_not_duplicate_the_next_occurrence() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2026, 9, 1))
                .recurring(Cadence::Monthly),
        )
        .await
        .unwrap();
    let cmd = ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id);

    engine.confirm_payment(cmd.clone()).await.unwrap();
    assert_eq!(pending_due_dates(&engine).await, vec![date(2026, 10, 1)]);

    // Same series state seen again after cancel: expansion must not run twice.
    engine.cancel_payment(created[0].id, "alice").await.unwrap();
    engine.confirm_payment(cmd).await.unwrap();
    assert_eq!(pending_due_dates(&engine).await, vec![date(2026, 10, 1)]);
}

#[tokio::test]
async fn expansion_skips_a_date_already_occupied_by_history() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2026, 9, 1))
                .recurring(Cadence::Monthly),
        )
        .await
        .unwrap();

    // Pay September, October and November, then drop the December tail.
    let mut last_paid = created[0].id;
    engine
        .confirm_payment(ConfirmPaymentCmd::new(last_paid, "alice").account_id(account_id))
        .await
        .unwrap();
    let october = pending_row(&engine).await;
    engine
        .confirm_payment(ConfirmPaymentCmd::new(october.id, "alice").account_id(account_id))
        .await
        .unwrap();
    let november = pending_row(&engine).await;
    engine
        .confirm_payment(ConfirmPaymentCmd::new(november.id, "alice").account_id(account_id))
        .await
        .unwrap();
    let december = pending_row(&engine).await;
    engine
        .delete_obligation(december.id, Scope::Single, "alice")
        .await
        .unwrap();
    last_paid = october.id;

    // Re-confirming October computes November as the next date, but a paid
    // November already exists; nothing new may appear.
    engine.cancel_payment(last_paid, "alice").await.unwrap();
    engine
        .confirm_payment(ConfirmPaymentCmd::new(last_paid, "alice").account_id(account_id))
        .await
        .unwrap();

    assert!(pending_due_dates(&engine).await.is_empty());
    let (all, _) = engine
        .list_obligations("alice", 50, None, &ObligationListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn paused_series_does_not_expand_until_resumed() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2026, 9, 1))
                .recurring(Cadence::Monthly),
        )
        .await
        .unwrap();
    let series_id = created[0].classification.series_id().unwrap();

    engine.pause_recurrence(series_id, "alice").await.unwrap();
    engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id))
        .await
        .unwrap();
    assert!(pending_due_dates(&engine).await.is_empty());

    // Resuming alone does not backfill; the next confirm expands again.
    engine.resume_recurrence(series_id, "alice").await.unwrap();
    assert!(pending_due_dates(&engine).await.is_empty());

    engine.cancel_payment(created[0].id, "alice").await.unwrap();
    engine
        .confirm_payment(ConfirmPaymentCmd::new(created[0].id, "alice").account_id(account_id))
        .await
        .unwrap();
    assert_eq!(pending_due_dates(&engine).await, vec![date(2026, 10, 1)]);
}

#[tokio::test]
async fn installment_series_cannot_be_paused() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 10))
                .installments(3),
        )
        .await
        .unwrap();
    let series_id = created[0].classification.series_id().unwrap();

    let err = engine.pause_recurrence(series_id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn confirming_an_installment_never_expands_the_group() {
    let (engine, _db) = engine_with_db().await;
    let account_id = Uuid::new_v4();

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 10))
                .installments(3),
        )
        .await
        .unwrap();

    for obligation in &created {
        engine
            .confirm_payment(ConfirmPaymentCmd::new(obligation.id, "alice").account_id(account_id))
            .await
            .unwrap();
    }

    // All three paid, nothing new materialized.
    assert!(pending_due_dates(&engine).await.is_empty());
    let entries = engine.list_ledger_entries("alice", false).await.unwrap();
    assert_eq!(entries.len(), 3);
    let total: i64 = entries.iter().map(|e| e.amount_minor).sum();
    assert_eq!(total, 9_000);
}
