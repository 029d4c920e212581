//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Scadenze:
//!
//! - `users`: authentication
//! - `series`: recurrence and installment groups
//! - `obligations`: scheduled dues, one row per occurrence
//! - `ledger_entries`: posted payments, soft-voided on cancel

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Series {
    Table,
    Id,
    UserId,
    Kind,
    Cadence,
    AnchorDate,
    Paused,
    TotalCount,
}

#[derive(Iden)]
pub enum Obligations {
    Table,
    Id,
    UserId,
    Direction,
    AmountMinor,
    Description,
    CategoryId,
    AccountId,
    DueDate,
    Status,
    SeriesId,
    InstallmentIndex,
    LedgerEntryId,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    UserId,
    Direction,
    AmountMinor,
    CategoryId,
    AccountId,
    PostedOn,
    ObligationId,
    VoidedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Series
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Series::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Series::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Series::UserId).string().not_null())
                    .col(ColumnDef::new(Series::Kind).string().not_null())
                    .col(ColumnDef::new(Series::Cadence).string())
                    .col(ColumnDef::new(Series::AnchorDate).date().not_null())
                    .col(
                        ColumnDef::new(Series::Paused)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Series::TotalCount).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-series-user_id")
                            .from(Series::Table, Series::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-series-user_id")
                    .table(Series::Table)
                    .col(Series::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Obligations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Obligations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Obligations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Obligations::UserId).string().not_null())
                    .col(ColumnDef::new(Obligations::Direction).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::Description).string())
                    .col(ColumnDef::new(Obligations::CategoryId).string())
                    .col(ColumnDef::new(Obligations::AccountId).string())
                    .col(ColumnDef::new(Obligations::DueDate).date().not_null())
                    .col(ColumnDef::new(Obligations::Status).string().not_null())
                    .col(ColumnDef::new(Obligations::SeriesId).string())
                    .col(ColumnDef::new(Obligations::InstallmentIndex).integer())
                    .col(ColumnDef::new(Obligations::LedgerEntryId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-user_id")
                            .from(Obligations::Table, Obligations::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-series_id")
                            .from(Obligations::Table, Obligations::SeriesId)
                            .to(Series::Table, Series::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-user_id-due_date")
                    .table(Obligations::Table)
                    .col(Obligations::UserId)
                    .col(Obligations::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-series_id-status")
                    .table(Obligations::Table)
                    .col(Obligations::SeriesId)
                    .col(Obligations::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::UserId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Direction).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::CategoryId).string())
                    .col(ColumnDef::new(LedgerEntries::AccountId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::PostedOn).date().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::ObligationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::VoidedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-user_id")
                            .from(LedgerEntries::Table, LedgerEntries::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-user_id-posted_on")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::PostedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-obligation_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::ObligationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Series::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
