use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::auth::adapter::outgoing::sea_orm_entity::users;
use crate::catalog::adapter::outgoing::sea_orm_entity::titles;

/// One row per `(author_id, title_id)`, enforced by `unique_author_title`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title_id: i32,

    pub author_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub score: i16,

    pub pub_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::catalog::adapter::outgoing::sea_orm_entity::titles::Entity",
        from = "Column::TitleId",
        to = "crate::catalog::adapter::outgoing::sea_orm_entity::titles::Column::Id",
        on_delete = "Cascade"
    )]
    Titles,

    #[sea_orm(
        belongs_to = "crate::auth::adapter::outgoing::sea_orm_entity::users::Entity",
        from = "Column::AuthorId",
        to = "crate::auth::adapter::outgoing::sea_orm_entity::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<titles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Titles.def()
    }
}

impl Related<users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
