use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::error;

use super::sea_orm_entity::{title_genres, titles};
use crate::catalog::application::domain::entities::TitleId;
use crate::catalog::application::ports::outgoing::{
    NewTitleData, TitleChanges, TitleRepository, TitleRepositoryError,
};

#[derive(Clone, Debug)]
pub struct TitleRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl TitleRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn map_db_err(e: DbErr) -> TitleRepositoryError {
        TitleRepositoryError::DatabaseError(e.to_string())
    }

    async fn link_genres(
        txn: &DatabaseTransaction,
        title_id: TitleId,
        genre_ids: Vec<i32>,
    ) -> Result<(), DbErr> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let links = genre_ids.into_iter().map(|genre_id| title_genres::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(genre_id),
        });

        title_genres::Entity::insert_many(links)
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn rollback(txn: DatabaseTransaction, cause: DbErr) -> TitleRepositoryError {
        if let Err(e) = txn.rollback().await {
            error!(error = %e, "Title transaction rollback failed");
        }
        Self::map_db_err(cause)
    }
}

#[async_trait]
impl TitleRepository for TitleRepositoryPostgres {
    async fn create(&self, data: NewTitleData) -> Result<TitleId, TitleRepositoryError> {
        let txn = self.db.begin().await.map_err(Self::map_db_err)?;

        let inserted = titles::ActiveModel {
            id: NotSet,
            name: Set(data.name),
            year: Set(data.year),
            description: Set(data.description),
            category_id: Set(data.category_id),
        }
        .insert(&txn)
        .await;

        let title = match inserted {
            Ok(title) => title,
            Err(e) => return Err(Self::rollback(txn, e).await),
        };

        if let Err(e) = Self::link_genres(&txn, title.id, data.genre_ids).await {
            return Err(Self::rollback(txn, e).await);
        }

        txn.commit().await.map_err(Self::map_db_err)?;
        Ok(title.id)
    }

    async fn update(&self, id: TitleId, changes: TitleChanges) -> Result<(), TitleRepositoryError> {
        let txn = self.db.begin().await.map_err(Self::map_db_err)?;

        let existing = match titles::Entity::find_by_id(id).one(&txn).await {
            Ok(Some(model)) => model,
            Ok(None) => {
                if let Err(e) = txn.rollback().await {
                    error!(error = %e, "Title transaction rollback failed");
                }
                return Err(TitleRepositoryError::NotFound);
            }
            Err(e) => return Err(Self::rollback(txn, e).await),
        };

        let mut active = existing.into_active_model();
        let mut touched = false;

        if let Some(name) = changes.name {
            active.name = Set(name);
            touched = true;
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
            touched = true;
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
            touched = true;
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
            touched = true;
        }

        if touched {
            if let Err(e) = active.update(&txn).await {
                return Err(Self::rollback(txn, e).await);
            }
        }

        if let Some(genre_ids) = changes.genre_ids {
            let cleared = title_genres::Entity::delete_many()
                .filter(title_genres::Column::TitleId.eq(id))
                .exec(&txn)
                .await;
            if let Err(e) = cleared {
                return Err(Self::rollback(txn, e).await);
            }
            if let Err(e) = Self::link_genres(&txn, id, genre_ids).await {
                return Err(Self::rollback(txn, e).await);
            }
        }

        txn.commit().await.map_err(Self::map_db_err)
    }

    async fn delete(&self, id: TitleId) -> Result<(), TitleRepositoryError> {
        let result = titles::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(Self::map_db_err)?;

        if result.rows_affected == 0 {
            return Err(TitleRepositoryError::NotFound);
        }
        Ok(())
    }
}
