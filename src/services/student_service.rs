//! Student Service - validation, store, cache and audit for students

use crate::domain::validation::validate_student;
use crate::domain::{DomainError, EntityKind, Student, StudentInput};
use crate::infrastructure::AppState;

const KIND: EntityKind = EntityKind::Student;

/// Validate and insert a new student
pub async fn create_student(
    state: &AppState,
    actor: &str,
    input: StudentInput,
) -> Result<Student, DomainError> {
    validate_student(&input)?;

    let student = state.student_repo.create(input).await?;

    state.audit.activity("CREATE_STUDENT", actor);
    state.audit.audit("CREATE", KIND, student.id, actor);

    Ok(student)
}

/// List all students (always from the store)
pub async fn list_students(state: &AppState) -> Result<Vec<Student>, DomainError> {
    state.student_repo.find_all().await
}

/// Cache first, then store; a store hit is written back to the cache
pub async fn get_student(state: &AppState, actor: &str, id: i32) -> Result<Student, DomainError> {
    state.audit.activity("GET_STUDENT", actor);

    if let Some(student) = state.cache.lookup::<Student>(KIND, id).await {
        return Ok(student);
    }

    let student = state
        .student_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("student"))?;

    state.cache.backfill(KIND, id, &student).await;
    Ok(student)
}

/// Validate and overwrite a student, then refresh its cache entry
pub async fn update_student(
    state: &AppState,
    actor: &str,
    id: i32,
    input: StudentInput,
) -> Result<Student, DomainError> {
    validate_student(&input)?;

    let student = state.student_repo.update(id, input).await?;

    state.cache.refresh(KIND, id, &student).await;
    state.audit.activity("UPDATE_STUDENT", actor);
    state.audit.audit("UPDATE", KIND, id, actor);

    Ok(student)
}

/// Delete a student and drop its cache entry
pub async fn delete_student(state: &AppState, actor: &str, id: i32) -> Result<(), DomainError> {
    state.student_repo.delete(id).await?;

    state.cache.evict(KIND, id).await;
    state.audit.activity("DELETE_STUDENT", actor);
    state.audit.audit("DELETE", KIND, id, actor);

    Ok(())
}
