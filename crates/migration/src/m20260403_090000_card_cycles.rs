//! Adds the card cycle marker to obligations.
//!
//! Obligations swept into a credit-card statement carry the cycle id and
//! can only be settled through the card flow, not confirmed directly.

use sea_orm_migration::prelude::*;

use crate::m20260210_000000_init::Obligations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ObligationsAlter {
    CardCycleId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Obligations::Table)
                    .add_column(ColumnDef::new(ObligationsAlter::CardCycleId).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-card_cycle_id")
                    .table(Obligations::Table)
                    .col(ObligationsAlter::CardCycleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-obligations-card_cycle_id")
                    .table(Obligations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Obligations::Table)
                    .drop_column(ObligationsAlter::CardCycleId)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
