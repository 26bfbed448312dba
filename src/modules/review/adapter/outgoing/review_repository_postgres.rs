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

use super::sea_orm_entity::reviews;
use crate::auth::adapter::outgoing::sea_orm_entity::users;
use crate::auth::application::domain::entities::UserId;
use crate::catalog::application::domain::entities::TitleId;
use crate::review::application::domain::entities::{Review, ReviewId};
use crate::review::application::ports::outgoing::{
    NewReviewData, ReviewChanges, ReviewRepository, ReviewRepositoryError,
};
use crate::shared::db::is_unique_violation;
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
struct ReviewRow {
    id: i32,
    title_id: i32,
    author_id: Uuid,
    author: String,
    text: String,
    score: i16,
    pub_date: DateTimeWithTimeZone,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            title_id: row.title_id,
            author_id: UserId::from(row.author_id),
            author: row.author,
            text: row.text,
            score: row.score,
            pub_date: row.pub_date.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReviewRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Review columns plus the author's username.
    fn with_author(query: Select<reviews::Entity>) -> Select<reviews::Entity> {
        query
            .select_only()
            .column(reviews::Column::Id)
            .column(reviews::Column::TitleId)
            .column(reviews::Column::AuthorId)
            .column_as(users::Column::Username, "author")
            .column(reviews::Column::Text)
            .column(reviews::Column::Score)
            .column(reviews::Column::PubDate)
            .join(JoinType::InnerJoin, reviews::Relation::Users.def())
    }

    async fn load(&self, review_id: ReviewId) -> Result<Review, ReviewRepositoryError> {
        Self::with_author(reviews::Entity::find().filter(reviews::Column::Id.eq(review_id)))
            .into_model::<ReviewRow>()
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .map(Review::from)
            .ok_or(ReviewRepositoryError::NotFound)
    }
}

fn map_db_err(e: DbErr) -> ReviewRepositoryError {
    if is_unique_violation(&e) {
        return ReviewRepositoryError::AlreadyReviewed;
    }
    ReviewRepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl ReviewRepository for ReviewRepositoryPostgres {
    async fn list_for_title(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<PageResult<Review>, ReviewRepositoryError> {
        let query = reviews::Entity::find().filter(reviews::Column::TitleId.eq(title_id));

        let total = query.clone().count(&*self.db).await.map_err(map_db_err)?;
        if total == 0 {
            return Ok(PageResult::empty(page));
        }

        let rows = Self::with_author(query)
            .order_by_desc(reviews::Column::PubDate)
            .order_by_desc(reviews::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .into_model::<ReviewRow>()
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(PageResult::new(
            rows.into_iter().map(Review::from).collect(),
            page,
            total,
        ))
    }

    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let row = Self::with_author(
            reviews::Entity::find()
                .filter(reviews::Column::Id.eq(review_id))
                .filter(reviews::Column::TitleId.eq(title_id)),
        )
        .into_model::<ReviewRow>()
        .one(&*self.db)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(Review::from))
    }

    async fn exists_for_author(
        &self,
        title_id: TitleId,
        author_id: UserId,
    ) -> Result<bool, ReviewRepositoryError> {
        let count = reviews::Entity::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .filter(reviews::Column::AuthorId.eq(author_id.value()))
            .count(&*self.db)
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn create(&self, data: NewReviewData) -> Result<Review, ReviewRepositoryError> {
        let inserted = reviews::ActiveModel {
            id: NotSet,
            title_id: Set(data.title_id),
            author_id: Set(data.author_id.value()),
            text: Set(data.text),
            score: Set(data.score),
            pub_date: Set(Utc::now().into()),
        }
        .insert(&*self.db)
        .await
        .map_err(map_db_err)?;

        self.load(inserted.id).await
    }

    async fn update(
        &self,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, ReviewRepositoryError> {
        if changes.text.is_none() && changes.score.is_none() {
            return self.load(review_id).await;
        }

        let mut update = reviews::Entity::update_many().filter(reviews::Column::Id.eq(review_id));
        if let Some(text) = changes.text {
            update = update.col_expr(reviews::Column::Text, Expr::value(text));
        }
        if let Some(score) = changes.score {
            update = update.col_expr(reviews::Column::Score, Expr::value(score));
        }

        let result = update.exec(&*self.db).await.map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(ReviewRepositoryError::NotFound);
        }

        self.load(review_id).await
    }

    async fn delete(&self, review_id: ReviewId) -> Result<(), ReviewRepositoryError> {
        let result = reviews::Entity::delete_by_id(review_id)
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(ReviewRepositoryError::NotFound);
        }
        Ok(())
    }
}
