//! Lecturer Service - validation, store, cache and audit for lecturers

use crate::domain::validation::validate_lecturer;
use crate::domain::{DomainError, EntityKind, Lecturer, LecturerInput};
use crate::infrastructure::AppState;

const KIND: EntityKind = EntityKind::Lecturer;

pub async fn create_lecturer(
    state: &AppState,
    actor: &str,
    input: LecturerInput,
) -> Result<Lecturer, DomainError> {
    validate_lecturer(&input)?;

    let lecturer = state.lecturer_repo.create(input).await?;

    state.audit.activity("CREATE_LECTURER", actor);
    state.audit.audit("CREATE", KIND, lecturer.id, actor);

    Ok(lecturer)
}

pub async fn list_lecturers(state: &AppState) -> Result<Vec<Lecturer>, DomainError> {
    state.lecturer_repo.find_all().await
}

pub async fn get_lecturer(
    state: &AppState,
    actor: &str,
    id: i32,
) -> Result<Lecturer, DomainError> {
    state.audit.activity("GET_LECTURER", actor);

    if let Some(lecturer) = state.cache.lookup::<Lecturer>(KIND, id).await {
        return Ok(lecturer);
    }

    let lecturer = state
        .lecturer_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("lecturer"))?;

    state.cache.backfill(KIND, id, &lecturer).await;
    Ok(lecturer)
}

pub async fn update_lecturer(
    state: &AppState,
    actor: &str,
    id: i32,
    input: LecturerInput,
) -> Result<Lecturer, DomainError> {
    validate_lecturer(&input)?;

    let lecturer = state.lecturer_repo.update(id, input).await?;

    state.cache.refresh(KIND, id, &lecturer).await;
    state.audit.activity("UPDATE_LECTURER", actor);
    state.audit.audit("UPDATE", KIND, id, actor);

    Ok(lecturer)
}

pub async fn delete_lecturer(state: &AppState, actor: &str, id: i32) -> Result<(), DomainError> {
    state.lecturer_repo.delete(id).await?;

    state.cache.evict(KIND, id).await;
    state.audit.activity("DELETE_LECTURER", actor);
    state.audit.audit("DELETE", KIND, id, actor);

    Ok(())
}
