//! Create `student` table.
//!
//! Surrogate integer key assigned by the database; `ra` uniqueness is added
//! by the index migration. Text columns carry no length limit.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn student_table() -> TableCreateStatement {
    Table::create()
        .table(Student::Table)
        .if_not_exists()
        .col(pk_auto(Student::Id))
        .col(text(Student::Name))
        .col(text(Student::Email))
        .col(text(Student::Ra))
        .col(text(Student::Cpf))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(student_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, Name, Email, Ra, Cpf }
