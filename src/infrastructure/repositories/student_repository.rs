//! SeaORM implementation of StudentRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{DomainError, Student, StudentInput, StudentRepository};
use crate::models::student::{ActiveModel, Column, Entity as StudentEntity};

/// SeaORM-based implementation of StudentRepository
pub struct SeaOrmStudentRepository {
    db: DatabaseConnection,
}

impl SeaOrmStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_from(input: StudentInput) -> ActiveModel {
    ActiveModel {
        name: Set(input.name),
        age: Set(input.age),
        email: Set(input.email),
        year: Set(input.year),
        ..Default::default()
    }
}

#[async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn find_all(&self) -> Result<Vec<Student>, DomainError> {
        let students = StudentEntity::find().all(&self.db).await?;
        Ok(students.into_iter().map(Student::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, DomainError> {
        let student = StudentEntity::find_by_id(id).one(&self.db).await?;
        Ok(student.map(Student::from))
    }

    async fn create(&self, input: StudentInput) -> Result<Student, DomainError> {
        let result = active_from(input).insert(&self.db).await?;
        Ok(Student::from(result))
    }

    async fn update(&self, id: i32, input: StudentInput) -> Result<Student, DomainError> {
        let student = Student {
            id,
            name: input.name.clone(),
            age: input.age,
            email: input.email.clone(),
            year: input.year.clone(),
        };

        let result = StudentEntity::update_many()
            .set(active_from(input))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("student"));
        }

        Ok(student)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = StudentEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("student"));
        }

        Ok(())
    }
}
