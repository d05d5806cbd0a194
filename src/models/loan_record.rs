use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub borrow_id: i32,
    pub user_id: i32,
    pub user_type: String, // 'student', 'lecturer'
    pub book_id: i32,
    pub borrow_date: String,
    pub return_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::library_item::Entity",
        from = "Column::BookId",
        to = "super::library_item::Column::BookId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    LibraryItem,
}

impl Related<super::library_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::LoanRecord {
    fn from(model: Model) -> Self {
        Self {
            borrow_id: model.borrow_id,
            user_id: model.user_id,
            user_type: model.user_type,
            book_id: model.book_id,
            borrow_date: model.borrow_date,
            return_date: model.return_date,
        }
    }
}
