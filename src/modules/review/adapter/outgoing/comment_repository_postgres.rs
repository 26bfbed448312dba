use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::sea_orm_entity::comments;
use crate::auth::adapter::outgoing::sea_orm_entity::users;
use crate::auth::application::domain::entities::UserId;
use crate::review::application::domain::entities::{Comment, CommentId, ReviewId};
use crate::review::application::ports::outgoing::{
    CommentRepository, CommentRepositoryError, NewCommentData,
};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
struct CommentRow {
    id: i32,
    review_id: i32,
    author_id: Uuid,
    author: String,
    text: String,
    pub_date: DateTimeWithTimeZone,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            review_id: row.review_id,
            author_id: UserId::from(row.author_id),
            author: row.author,
            text: row.text,
            pub_date: row.pub_date.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CommentRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl CommentRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn with_author(query: Select<comments::Entity>) -> Select<comments::Entity> {
        query
            .select_only()
            .column(comments::Column::Id)
            .column(comments::Column::ReviewId)
            .column(comments::Column::AuthorId)
            .column_as(users::Column::Username, "author")
            .column(comments::Column::Text)
            .column(comments::Column::PubDate)
            .join(JoinType::InnerJoin, comments::Relation::Users.def())
    }

    async fn load(&self, comment_id: CommentId) -> Result<Comment, CommentRepositoryError> {
        Self::with_author(comments::Entity::find().filter(comments::Column::Id.eq(comment_id)))
            .into_model::<CommentRow>()
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .map(Comment::from)
            .ok_or(CommentRepositoryError::NotFound)
    }
}

fn map_db_err(e: DbErr) -> CommentRepositoryError {
    CommentRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl CommentRepository for CommentRepositoryPostgres {
    async fn list_for_review(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<PageResult<Comment>, CommentRepositoryError> {
        let query = comments::Entity::find().filter(comments::Column::ReviewId.eq(review_id));

        let total = query.clone().count(&*self.db).await.map_err(map_db_err)?;
        if total == 0 {
            return Ok(PageResult::empty(page));
        }

        let rows = Self::with_author(query)
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .into_model::<CommentRow>()
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(PageResult::new(
            rows.into_iter().map(Comment::from).collect(),
            page,
            total,
        ))
    }

    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let row = Self::with_author(
            comments::Entity::find()
                .filter(comments::Column::Id.eq(comment_id))
                .filter(comments::Column::ReviewId.eq(review_id)),
        )
        .into_model::<CommentRow>()
        .one(&*self.db)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(Comment::from))
    }

    async fn create(&self, data: NewCommentData) -> Result<Comment, CommentRepositoryError> {
        let inserted = comments::ActiveModel {
            id: NotSet,
            review_id: Set(data.review_id),
            author_id: Set(data.author_id.value()),
            text: Set(data.text),
            pub_date: Set(Utc::now().into()),
        }
        .insert(&*self.db)
        .await
        .map_err(map_db_err)?;

        self.load(inserted.id).await
    }

    async fn update(
        &self,
        comment_id: CommentId,
        text: String,
    ) -> Result<Comment, CommentRepositoryError> {
        let result = comments::Entity::update_many()
            .col_expr(comments::Column::Text, Expr::value(text))
            .filter(comments::Column::Id.eq(comment_id))
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(CommentRepositoryError::NotFound);
        }
        self.load(comment_id).await
    }

    async fn delete(&self, comment_id: CommentId) -> Result<(), CommentRepositoryError> {
        let result = comments::Entity::delete_by_id(comment_id)
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(CommentRepositoryError::NotFound);
        }
        Ok(())
    }
}
