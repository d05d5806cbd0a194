//! SeaORM implementation of LibraryItemRepository
//!
//! Also hosts the availability counters used by the loan workflow. They are
//! generic over `ConnectionTrait` so they can run inside a transaction.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use super::loan_repository::delete_loans_for_book;
use crate::domain::{DomainError, LibraryItem, LibraryItemInput, LibraryItemRepository};
use crate::models::library_item::{ActiveModel, Column, Entity as LibraryItemEntity};

/// Take one copy off the shelf.
///
/// A single conditional `UPDATE ... WHERE available_copies > 0`, so two
/// concurrent borrows can never drive the count below zero. Zero rows
/// affected means the book is missing (`NotFound`) or out of copies
/// (`Conflict`).
pub async fn decrement_availability<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<(), DomainError> {
    let result = LibraryItemEntity::update_many()
        .col_expr(
            Column::AvailableCopies,
            Expr::col(Column::AvailableCopies).sub(1),
        )
        .filter(Column::BookId.eq(book_id))
        .filter(Column::AvailableCopies.gt(0))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match LibraryItemEntity::find_by_id(book_id).one(conn).await? {
            Some(_) => Err(DomainError::Conflict("book not available".to_string())),
            None => Err(DomainError::not_found("book")),
        };
    }

    Ok(())
}

/// Put one copy back on the shelf.
pub async fn increment_availability<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<(), DomainError> {
    let result = LibraryItemEntity::update_many()
        .col_expr(
            Column::AvailableCopies,
            Expr::col(Column::AvailableCopies).add(1),
        )
        .filter(Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::not_found("book"));
    }

    Ok(())
}

/// SeaORM-based implementation of LibraryItemRepository
pub struct SeaOrmLibraryItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmLibraryItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LibraryItemRepository for SeaOrmLibraryItemRepository {
    async fn find_all(&self) -> Result<Vec<LibraryItem>, DomainError> {
        let items = LibraryItemEntity::find().all(&self.db).await?;
        Ok(items.into_iter().map(LibraryItem::from).collect())
    }

    async fn find_by_id(&self, book_id: i32) -> Result<Option<LibraryItem>, DomainError> {
        let item = LibraryItemEntity::find_by_id(book_id).one(&self.db).await?;
        Ok(item.map(LibraryItem::from))
    }

    async fn create(&self, input: LibraryItemInput) -> Result<LibraryItem, DomainError> {
        let new_item = ActiveModel {
            book_name: Set(input.book_name),
            title: Set(input.title),
            author: Set(input.author),
            available_copies: Set(input.available_copies),
            ..Default::default()
        };

        let result = new_item.insert(&self.db).await?;
        Ok(LibraryItem::from(result))
    }

    async fn update(
        &self,
        book_id: i32,
        input: LibraryItemInput,
    ) -> Result<LibraryItem, DomainError> {
        let changes = ActiveModel {
            book_name: Set(input.book_name.clone()),
            title: Set(input.title.clone()),
            author: Set(input.author.clone()),
            available_copies: Set(input.available_copies),
            ..Default::default()
        };

        let result = LibraryItemEntity::update_many()
            .set(changes)
            .filter(Column::BookId.eq(book_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("library"));
        }

        Ok(LibraryItem {
            book_id,
            book_name: input.book_name,
            title: input.title,
            author: input.author,
            available_copies: input.available_copies,
        })
    }

    async fn delete_with_loans(&self, book_id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let removed_loans = match delete_loans_for_book(&txn, book_id).await {
            Ok(n) => n,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };
        let result = match LibraryItemEntity::delete_by_id(book_id).exec(&txn).await {
            Ok(result) => result,
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        };

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::not_found("library"));
        }

        txn.commit().await?;
        tracing::debug!(book_id, removed_loans, "deleted book and its loans");
        Ok(())
    }
}
