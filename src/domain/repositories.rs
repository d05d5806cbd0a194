//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use super::records::{
    BorrowerKind, Lecturer, LecturerInput, LibraryItem, LibraryItemInput, LoanHistoryEntry,
    LoanRecord, Student, StudentInput,
};

/// Repository trait for Student entity
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find all students
    async fn find_all(&self) -> Result<Vec<Student>, DomainError>;

    /// Find a student by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, DomainError>;

    /// Create a new student
    async fn create(&self, input: StudentInput) -> Result<Student, DomainError>;

    /// Overwrite a student; `NotFound` when no row has this ID
    async fn update(&self, id: i32, input: StudentInput) -> Result<Student, DomainError>;

    /// Delete a student; `NotFound` when no row has this ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Lecturer entity
#[async_trait]
pub trait LecturerRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Lecturer>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Lecturer>, DomainError>;

    async fn create(&self, input: LecturerInput) -> Result<Lecturer, DomainError>;

    async fn update(&self, id: i32, input: LecturerInput) -> Result<Lecturer, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for catalogued books
#[async_trait]
pub trait LibraryItemRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<LibraryItem>, DomainError>;

    async fn find_by_id(&self, book_id: i32) -> Result<Option<LibraryItem>, DomainError>;

    async fn create(&self, input: LibraryItemInput) -> Result<LibraryItem, DomainError>;

    async fn update(&self, book_id: i32, input: LibraryItemInput)
    -> Result<LibraryItem, DomainError>;

    /// Delete a book together with every loan that references it.
    /// Runs in one transaction; `NotFound` leaves the loans untouched.
    async fn delete_with_loans(&self, book_id: i32) -> Result<(), DomainError>;
}

/// Repository trait for the borrow/return workflow
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Take one copy off the shelf and open a loan for it, atomically.
    ///
    /// `NotFound` if the book does not exist, `Conflict` if no copy is left.
    async fn borrow(
        &self,
        user_id: i32,
        kind: BorrowerKind,
        book_id: i32,
    ) -> Result<LoanRecord, DomainError>;

    /// Close the borrower's open loan on this book and put the copy back,
    /// atomically. `NotFound` if there is no open loan.
    async fn return_book(
        &self,
        user_id: i32,
        kind: BorrowerKind,
        book_id: i32,
    ) -> Result<LoanRecord, DomainError>;

    /// Every loan joined with its book, most recent first
    async fn history(&self) -> Result<Vec<LoanHistoryEntry>, DomainError>;
}
