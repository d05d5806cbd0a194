use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "libraries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub book_id: i32,
    pub book_name: String,
    pub title: String,
    pub author: String,
    /// Copies currently on the shelf. Decremented by a borrow, incremented
    /// by a return; never driven below zero.
    pub available_copies: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loan_record::Entity")]
    LoanRecord,
}

impl Related<super::loan_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::LibraryItem {
    fn from(model: Model) -> Self {
        Self {
            book_id: model.book_id,
            book_name: model.book_name,
            title: model.title,
            author: model.author,
            available_copies: model.available_copies,
        }
    }
}
