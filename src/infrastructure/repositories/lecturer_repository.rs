//! SeaORM implementation of LecturerRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{DomainError, Lecturer, LecturerInput, LecturerRepository};
use crate::models::lecturer::{ActiveModel, Column, Entity as LecturerEntity};

pub struct SeaOrmLecturerRepository {
    db: DatabaseConnection,
}

impl SeaOrmLecturerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LecturerRepository for SeaOrmLecturerRepository {
    async fn find_all(&self) -> Result<Vec<Lecturer>, DomainError> {
        let lecturers = LecturerEntity::find().all(&self.db).await?;
        Ok(lecturers.into_iter().map(Lecturer::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Lecturer>, DomainError> {
        let lecturer = LecturerEntity::find_by_id(id).one(&self.db).await?;
        Ok(lecturer.map(Lecturer::from))
    }

    async fn create(&self, input: LecturerInput) -> Result<Lecturer, DomainError> {
        let new_lecturer = ActiveModel {
            name: Set(input.name),
            age: Set(input.age),
            email: Set(input.email),
            designation: Set(input.designation),
            ..Default::default()
        };

        let result = new_lecturer.insert(&self.db).await?;
        Ok(Lecturer::from(result))
    }

    async fn update(&self, id: i32, input: LecturerInput) -> Result<Lecturer, DomainError> {
        let changes = ActiveModel {
            name: Set(input.name.clone()),
            age: Set(input.age),
            email: Set(input.email.clone()),
            designation: Set(input.designation.clone()),
            ..Default::default()
        };

        let result = LecturerEntity::update_many()
            .set(changes)
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("lecturer"));
        }

        Ok(Lecturer {
            id,
            name: input.name,
            age: input.age,
            email: input.email,
            designation: input.designation,
        })
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = LecturerEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("lecturer"));
        }

        Ok(())
    }
}
