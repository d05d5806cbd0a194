pub mod lecturer;
pub mod library_item;
pub mod loan_record;
pub mod student;
pub mod user;
