//! SeaORM implementation of LoanRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::library_item_repository::{decrement_availability, increment_availability};
use crate::domain::{BorrowerKind, DomainError, LoanHistoryEntry, LoanRecord, LoanRepository};
use crate::models::library_item::Entity as LibraryItemEntity;
use crate::models::loan_record::{self, ActiveModel, Column, Entity as LoanEntity};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Insert an open loan stamped with the current time.
pub async fn open_loan_for<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    kind: BorrowerKind,
    book_id: i32,
) -> Result<loan_record::Model, DomainError> {
    let new_loan = ActiveModel {
        user_id: Set(user_id),
        user_type: Set(kind.as_str().to_owned()),
        book_id: Set(book_id),
        borrow_date: Set(now()),
        return_date: Set(None),
        ..Default::default()
    };

    Ok(new_loan.insert(conn).await?)
}

/// Stamp the return date on the borrower's oldest open loan for this book.
///
/// The stamp is conditional on the loan still being open, so a concurrent
/// return of the same loan sees zero rows and reports `NotFound`.
pub async fn close_loan_for<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    kind: BorrowerKind,
    book_id: i32,
) -> Result<loan_record::Model, DomainError> {
    let no_active_loan = || DomainError::NotFound("no active borrow record found".to_string());

    let open = LoanEntity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::UserType.eq(kind.as_str()))
        .filter(Column::BookId.eq(book_id))
        .filter(Column::ReturnDate.is_null())
        .order_by_asc(Column::BorrowId)
        .one(conn)
        .await?
        .ok_or_else(no_active_loan)?;

    let returned_at = now();
    let result = LoanEntity::update_many()
        .col_expr(Column::ReturnDate, Expr::value(returned_at.clone()))
        .filter(Column::BorrowId.eq(open.borrow_id))
        .filter(Column::ReturnDate.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(no_active_loan());
    }

    Ok(loan_record::Model {
        return_date: Some(returned_at),
        ..open
    })
}

/// Remove every loan, open or closed, that references this book.
/// Returns how many were removed.
pub async fn delete_loans_for_book<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<u64, DomainError> {
    let result = LoanEntity::delete_many()
        .filter(Column::BookId.eq(book_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// SeaORM-based implementation of LoanRepository
pub struct SeaOrmLoanRepository {
    db: DatabaseConnection,
}

impl SeaOrmLoanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoanRepository for SeaOrmLoanRepository {
    async fn borrow(
        &self,
        user_id: i32,
        kind: BorrowerKind,
        book_id: i32,
    ) -> Result<LoanRecord, DomainError> {
        let txn = self.db.begin().await?;

        // The conditional decrement doubles as the availability check.
        if let Err(e) = decrement_availability(&txn, book_id).await {
            txn.rollback().await?;
            return Err(e);
        }
        let loan = match open_loan_for(&txn, user_id, kind, book_id).await {
            Ok(loan) => loan,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        txn.commit().await?;
        Ok(LoanRecord::from(loan))
    }

    async fn return_book(
        &self,
        user_id: i32,
        kind: BorrowerKind,
        book_id: i32,
    ) -> Result<LoanRecord, DomainError> {
        let txn = self.db.begin().await?;

        let loan = match close_loan_for(&txn, user_id, kind, book_id).await {
            Ok(loan) => loan,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };
        if let Err(e) = increment_availability(&txn, book_id).await {
            txn.rollback().await?;
            return Err(e);
        }

        txn.commit().await?;
        Ok(LoanRecord::from(loan))
    }

    async fn history(&self) -> Result<Vec<LoanHistoryEntry>, DomainError> {
        let loans_with_books = LoanEntity::find()
            .find_also_related(LibraryItemEntity)
            .order_by_desc(Column::BorrowId)
            .all(&self.db)
            .await?;

        // Inner-join semantics: a loan whose book is gone is not history.
        let entries = loans_with_books
            .into_iter()
            .filter_map(|(loan, book)| {
                book.map(|book| LoanHistoryEntry {
                    borrow_id: loan.borrow_id,
                    user_id: loan.user_id,
                    user_type: loan.user_type,
                    book_id: loan.book_id,
                    book_name: book.book_name,
                    borrow_date: loan.borrow_date,
                    return_date: loan.return_date,
                })
            })
            .collect();

        Ok(entries)
    }
}
