//! Repository implementations using SeaORM

pub mod lecturer_repository;
pub mod library_item_repository;
pub mod loan_repository;
pub mod student_repository;

pub use lecturer_repository::SeaOrmLecturerRepository;
pub use library_item_repository::SeaOrmLibraryItemRepository;
pub use loan_repository::SeaOrmLoanRepository;
pub use student_repository::SeaOrmStudentRepository;
