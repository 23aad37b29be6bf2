use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set, SqlErr, Unchanged};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    #[sea_orm(unique)]
    pub ra: String,
    pub cpf: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A student that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

impl NewStudent {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_required("name", &self.name)?;
        validate_required("email", &self.email)?;
        validate_required("ra", &self.ra)?;
        validate_required("cpf", &self.cpf)?;
        Ok(())
    }
}

pub fn validate_required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    Ok(())
}

/// Translate driver errors, keeping unique-index violations distinguishable.
pub fn map_db_err(e: DbErr) -> ModelError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => ModelError::Duplicate(msg),
        _ => match e {
            DbErr::RecordNotUpdated => ModelError::NotFound,
            other => ModelError::Db(other.to_string()),
        },
    }
}

pub async fn create(db: &DatabaseConnection, new: NewStudent) -> Result<Model, ModelError> {
    new.validate()?;
    let am = ActiveModel {
        id: NotSet,
        name: Set(new.name),
        email: Set(new.email),
        ra: Set(new.ra),
        cpf: Set(new.cpf),
    };
    am.insert(db).await.map_err(map_db_err)
}

/// Persist `name` and `email` of an existing row. `ra` and `cpf` are never written.
pub async fn save_contact(db: &DatabaseConnection, student: Model) -> Result<Model, ModelError> {
    validate_required("name", &student.name)?;
    validate_required("email", &student.email)?;
    let am = ActiveModel {
        id: Unchanged(student.id),
        name: Set(student.name),
        email: Set(student.email),
        ra: Unchanged(student.ra),
        cpf: Unchanged(student.cpf),
    };
    am.update(db).await.map_err(map_db_err)
}
