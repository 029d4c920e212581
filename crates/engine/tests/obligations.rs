use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Cadence, Classification, CreateObligationCmd, Direction, EditObligationCmd, Engine,
    EngineError, ObligationKind, ObligationListFilter, ObligationStatus, Scope,
};
use migration::MigratorTrait;

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

#[tokio::test]
async fn create_once_yields_single_pending_row() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 4_500, date(2026, 9, 10))
                .description("electricity bill"),
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    let obligation = &created[0];
    assert_eq!(obligation.status, ObligationStatus::Pending);
    assert_eq!(obligation.classification, Classification::Plain);
    assert_eq!(obligation.amount_minor, 4_500);

    let reread = engine.obligation(obligation.id, "alice").await.unwrap();
    assert_eq!(&reread, obligation);
}

#[tokio::test]
async fn create_rejects_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_obligation(CreateObligationCmd::new(
            "alice",
            Direction::Expense,
            0,
            date(2026, 9, 10),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn recurring_creates_anchor_occurrence_only() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2026, 9, 1))
                .recurring(Cadence::Monthly)
                .description("rent"),
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    let Classification::Recurring { series_id } = created[0].classification else {
        panic!("expected a recurring classification");
    };

    let series = engine.series(series_id, "alice").await.unwrap();
    assert_eq!(series.cadence, Some(Cadence::Monthly));
    assert!(!series.paused);
    assert_eq!(series.anchor_date, date(2026, 9, 1));
}

#[tokio::test]
async fn installment_group_is_pre_generated_with_exact_split() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 10_000, date(2026, 1, 15))
                .installments(3)
                .description("washing machine"),
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 3);
    let amounts: Vec<i64> = created.iter().map(|o| o.amount_minor).collect();
    assert_eq!(amounts, vec![3_334, 3_333, 3_333]);
    assert_eq!(amounts.iter().sum::<i64>(), 10_000);

    let dues: Vec<NaiveDate> = created.iter().map(|o| o.due_date).collect();
    assert_eq!(
        dues,
        vec![date(2026, 1, 15), date(2026, 2, 15), date(2026, 3, 15)]
    );

    for (i, obligation) in created.iter().enumerate() {
        let Classification::Installment { index, .. } = obligation.classification else {
            panic!("expected an installment classification");
        };
        assert_eq!(index, i as u32 + 1);
    }
}

#[tokio::test]
async fn installment_due_dates_clamp_to_month_end() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 31))
                .installments(3),
        )
        .await
        .unwrap();

    let dues: Vec<NaiveDate> = created.iter().map(|o| o.due_date).collect();
    // February has no 31st; March recovers the anchor day.
    assert_eq!(
        dues,
        vec![date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)]
    );
}

#[tokio::test]
async fn installment_amount_below_one_unit_per_share_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    // 2 minor units cannot cover 3 installments without a zero share.
    let err = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 2, date(2026, 1, 15))
                .installments(3),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing was persisted, not even a partial group.
    let (rows, _) = engine
        .list_obligations("alice", 50, None, &ObligationListFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());

    // One unit per share is the boundary and still splits cleanly.
    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 3, date(2026, 1, 15))
                .installments(3),
        )
        .await
        .unwrap();
    assert!(created.iter().all(|o| o.amount_minor == 1));
}

#[tokio::test]
async fn installment_total_below_two_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 10_000, date(2026, 1, 15))
                .installments(1),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn single_edit_touches_only_the_target() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 10))
                .installments(3),
        )
        .await
        .unwrap();

    let touched = engine
        .edit_obligation(
            EditObligationCmd::new(created[1].id, "alice", Scope::Single).amount_minor(5_000),
        )
        .await
        .unwrap();
    assert_eq!(touched, vec![created[1].id]);

    let first = engine.obligation(created[0].id, "alice").await.unwrap();
    let second = engine.obligation(created[1].id, "alice").await.unwrap();
    assert_eq!(first.amount_minor, 3_000);
    assert_eq!(second.amount_minor, 5_000);
}

#[tokio::test]
async fn future_edit_updates_the_pending_tail() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 25_000, date(2026, 1, 10))
                .installments(5),
        )
        .await
        .unwrap();

    let touched = engine
        .edit_obligation(
            EditObligationCmd::new(created[1].id, "alice", Scope::Future)
                .description("new phone, renegotiated"),
        )
        .await
        .unwrap();
    assert_eq!(touched.len(), 4);

    let first = engine.obligation(created[0].id, "alice").await.unwrap();
    assert_eq!(first.description, None);
    for obligation in &created[1..] {
        let reread = engine.obligation(obligation.id, "alice").await.unwrap();
        assert_eq!(reread.description.as_deref(), Some("new phone, renegotiated"));
    }
}

#[tokio::test]
async fn due_date_edit_with_future_scope_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 10))
                .installments(3),
        )
        .await
        .unwrap();

    let err = engine
        .edit_obligation(
            EditObligationCmd::new(created[0].id, "alice", Scope::Future)
                .due_date(date(2026, 2, 1)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn empty_edit_is_rejected() {
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
        .edit_obligation(EditObligationCmd::new(created[0].id, "alice", Scope::Single))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn future_delete_removes_tail_and_keeps_earlier_rows() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 1, 10))
                .installments(3),
        )
        .await
        .unwrap();
    let series_id = created[0].classification.series_id().unwrap();

    let deleted = engine
        .delete_obligation(created[1].id, Scope::Future, "alice")
        .await
        .unwrap();
    assert_eq!(deleted.len(), 2);

    // The first installment keeps its index; no renumbering happened.
    let first = engine.obligation(created[0].id, "alice").await.unwrap();
    assert_eq!(
        first.classification,
        Classification::Installment {
            series_id,
            index: 1
        }
    );

    let err = engine.obligation(created[1].id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Series survives while an occurrence still references it.
    engine.series(series_id, "alice").await.unwrap();
}

#[tokio::test]
async fn deleting_the_last_occurrence_drops_the_series() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 80_000, date(2026, 9, 1))
                .recurring(Cadence::Monthly),
        )
        .await
        .unwrap();
    let series_id = created[0].classification.series_id().unwrap();

    engine
        .delete_obligation(created[0].id, Scope::Single, "alice")
        .await
        .unwrap();

    let err = engine.series(series_id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_an_obligation() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["bob".into(), "password".into()],
    ))
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

    let err = engine.obligation(created[0].id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .delete_obligation(created[0].id, Scope::Single, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_filters_by_status_kind_and_text() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 4_500, date(2026, 9, 10))
                .description("Electricity Bill"),
        )
        .await
        .unwrap();
    engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Income, 120_000, date(2026, 9, 27))
                .description("consulting invoice"),
        )
        .await
        .unwrap();
    engine
        .create_obligation(
            CreateObligationCmd::new("alice", Direction::Expense, 9_000, date(2026, 10, 5))
                .installments(3),
        )
        .await
        .unwrap();

    let filter = ObligationListFilter {
        kind: Some(ObligationKind::Installment),
        ..Default::default()
    };
    let (rows, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);

    let filter = ObligationListFilter {
        direction: Some(Direction::Income),
        ..Default::default()
    };
    let (rows, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    // Case-insensitive substring match.
    let filter = ObligationListFilter {
        search_text: Some("electricity".to_string()),
        ..Default::default()
    };
    let (rows, _) = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description.as_deref(), Some("Electricity Bill"));
}

#[tokio::test]
async fn list_paginates_by_due_date_with_cursor() {
    let (engine, _db) = engine_with_db().await;

    for day in 1..=5 {
        engine
            .create_obligation(CreateObligationCmd::new(
                "alice",
                Direction::Expense,
                1_000,
                date(2026, 9, day),
            ))
            .await
            .unwrap();
    }

    let filter = ObligationListFilter::default();
    let (page_one, cursor) = engine
        .list_obligations("alice", 2, None, &filter)
        .await
        .unwrap();
    assert_eq!(page_one.len(), 2);
    let cursor = cursor.expect("expected a next cursor");
    assert_eq!(page_one[0].due_date, date(2026, 9, 1));
    assert_eq!(page_one[1].due_date, date(2026, 9, 2));

    let (page_two, cursor) = engine
        .list_obligations("alice", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page_two.len(), 2);
    assert_eq!(page_two[0].due_date, date(2026, 9, 3));
    let cursor = cursor.expect("expected a next cursor");

    let (page_three, cursor) = engine
        .list_obligations("alice", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page_three.len(), 1);
    assert!(cursor.is_none());
}

#[tokio::test]
async fn list_rejects_inverted_date_range_and_bad_cursor() {
    let (engine, _db) = engine_with_db().await;

    let filter = ObligationListFilter {
        from: Some(date(2026, 9, 30)),
        to: Some(date(2026, 9, 1)),
        ..Default::default()
    };
    let err = engine
        .list_obligations("alice", 50, None, &filter)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .list_obligations("alice", 50, Some("not-a-cursor"), &ObligationListFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCursor(_)));
}
