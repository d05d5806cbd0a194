//! Library Service - catalogue CRUD and the borrow/return workflow
//!
//! A loan moves a (borrower, book) pair from no active loan to on loan and
//! back. Both transitions are single store transactions; afterwards the
//! book's cache entry is dropped because its `available_copies` changed.

use crate::domain::validation::{validate_library_item, validate_loan_request};
use crate::domain::{
    DomainError, EntityKind, LibraryItem, LibraryItemInput, LoanHistoryEntry, LoanRecord,
    LoanRequest,
};
use crate::infrastructure::AppState;

const KIND: EntityKind = EntityKind::Library;

pub async fn create_item(
    state: &AppState,
    actor: &str,
    input: LibraryItemInput,
) -> Result<LibraryItem, DomainError> {
    validate_library_item(&input)?;

    let item = state.library_repo.create(input).await?;

    state.audit.audit("CREATE", KIND, item.book_id, actor);
    Ok(item)
}

pub async fn list_items(state: &AppState) -> Result<Vec<LibraryItem>, DomainError> {
    state.library_repo.find_all().await
}

pub async fn get_item(
    state: &AppState,
    actor: &str,
    book_id: i32,
) -> Result<LibraryItem, DomainError> {
    state.audit.activity("GET_LIBRARY", actor);

    if let Some(item) = state.cache.lookup::<LibraryItem>(KIND, book_id).await {
        return Ok(item);
    }

    let item = state
        .library_repo
        .find_by_id(book_id)
        .await?
        .ok_or_else(|| DomainError::not_found("book"))?;

    state.cache.backfill(KIND, book_id, &item).await;
    Ok(item)
}

pub async fn update_item(
    state: &AppState,
    actor: &str,
    book_id: i32,
    input: LibraryItemInput,
) -> Result<LibraryItem, DomainError> {
    validate_library_item(&input)?;

    let item = state.library_repo.update(book_id, input).await?;

    state.cache.refresh(KIND, book_id, &item).await;
    state.audit.activity("UPDATE_LIBRARY", actor);
    state.audit.audit("UPDATE", KIND, book_id, actor);

    Ok(item)
}

/// Delete a book and every loan that references it
pub async fn delete_item(state: &AppState, actor: &str, book_id: i32) -> Result<(), DomainError> {
    state.library_repo.delete_with_loans(book_id).await?;

    state.cache.evict(KIND, book_id).await;
    state.audit.activity("DELETE_LIBRARY", actor);
    state.audit.audit("DELETE", KIND, book_id, actor);

    Ok(())
}

/// NoActiveLoan -> OnLoan
pub async fn borrow_book(
    state: &AppState,
    actor: &str,
    request: LoanRequest,
) -> Result<LoanRecord, DomainError> {
    let kind = validate_loan_request(&request)?;

    let loan = state
        .loan_repo
        .borrow(request.user_id, kind, request.book_id)
        .await?;

    tracing::info!(
        borrow_id = loan.borrow_id,
        user_id = loan.user_id,
        user_type = %loan.user_type,
        book_id = loan.book_id,
        "book borrowed"
    );

    state.cache.evict(KIND, request.book_id).await;
    state.audit.activity("BORROW_RECORD", actor);
    state.audit.audit("BORROW", EntityKind::Loan, loan.borrow_id, actor);

    Ok(loan)
}

/// OnLoan -> NoActiveLoan
pub async fn return_book(
    state: &AppState,
    actor: &str,
    request: LoanRequest,
) -> Result<LoanRecord, DomainError> {
    let kind = validate_loan_request(&request)?;

    let loan = state
        .loan_repo
        .return_book(request.user_id, kind, request.book_id)
        .await?;

    tracing::info!(
        borrow_id = loan.borrow_id,
        book_id = loan.book_id,
        "book returned"
    );

    state.cache.evict(KIND, request.book_id).await;
    state.audit.activity("RETURN_RECORD", actor);
    state.audit.audit("RETURN", EntityKind::Loan, loan.borrow_id, actor);

    Ok(loan)
}

/// All loans with book names, most recent first
pub async fn loan_history(state: &AppState) -> Result<Vec<LoanHistoryEntry>, DomainError> {
    state.loan_repo.history().await
}
