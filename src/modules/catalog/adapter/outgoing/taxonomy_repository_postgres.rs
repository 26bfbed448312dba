use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

use super::sea_orm_entity::{categories, genres};
use crate::catalog::application::domain::entities::{TaxonomyEntry, TaxonomyKind};
use crate::catalog::application::ports::outgoing::{TaxonomyRepository, TaxonomyRepositoryError};
use crate::shared::db::is_unique_violation;
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::search::contains_ci;

/// `categories` and `genres` share one shape; the instance's kind picks the table.
#[derive(Clone, Debug)]
pub struct TaxonomyRepositoryPostgres {
    db: Arc<DatabaseConnection>,
    kind: TaxonomyKind,
}

impl TaxonomyRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>, kind: TaxonomyKind) -> Self {
        Self { db, kind }
    }
}

fn map_db_err(e: DbErr) -> TaxonomyRepositoryError {
    if is_unique_violation(&e) {
        return TaxonomyRepositoryError::SlugTaken;
    }
    TaxonomyRepositoryError::DatabaseError(e.to_string())
}

async fn list_entries<E>(
    db: &DatabaseConnection,
    name: E::Column,
    search: Option<String>,
    page: PageRequest,
) -> Result<PageResult<TaxonomyEntry>, DbErr>
where
    E: EntityTrait,
    E::Model: Into<TaxonomyEntry> + Sync + 'static,
{
    let mut query = E::find();
    if let Some(search) = search.as_deref() {
        query = query.filter(contains_ci(name, search));
    }

    let total = query.clone().count(db).await?;
    if total == 0 {
        return Ok(PageResult::empty(page));
    }

    let models = query
        .order_by_asc(name)
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;

    Ok(PageResult::new(
        models.into_iter().map(Into::into).collect(),
        page,
        total,
    ))
}

async fn entries_by_slugs<E>(
    db: &DatabaseConnection,
    slug: E::Column,
    slugs: &[String],
) -> Result<Vec<TaxonomyEntry>, DbErr>
where
    E: EntityTrait,
    E::Model: Into<TaxonomyEntry>,
{
    let models = E::find()
        .filter(slug.is_in(slugs.iter().cloned()))
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

async fn delete_entry<E>(db: &DatabaseConnection, slug_column: E::Column, slug: &str) -> Result<u64, DbErr>
where
    E: EntityTrait,
{
    let result = E::delete_many()
        .filter(slug_column.eq(slug))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[async_trait]
impl TaxonomyRepository for TaxonomyRepositoryPostgres {
    fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<TaxonomyEntry>, TaxonomyRepositoryError> {
        let result = match self.kind {
            TaxonomyKind::Category => {
                list_entries::<categories::Entity>(&self.db, categories::Column::Name, search, page)
                    .await
            }
            TaxonomyKind::Genre => {
                list_entries::<genres::Entity>(&self.db, genres::Column::Name, search, page).await
            }
        };
        result.map_err(map_db_err)
    }

    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyRepositoryError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let result = match self.kind {
            TaxonomyKind::Category => {
                entries_by_slugs::<categories::Entity>(&self.db, categories::Column::Slug, slugs)
                    .await
            }
            TaxonomyKind::Genre => {
                entries_by_slugs::<genres::Entity>(&self.db, genres::Column::Slug, slugs).await
            }
        };
        result.map_err(map_db_err)
    }

    async fn create(
        &self,
        name: String,
        slug: String,
    ) -> Result<TaxonomyEntry, TaxonomyRepositoryError> {
        let entry = match self.kind {
            TaxonomyKind::Category => categories::ActiveModel {
                id: NotSet,
                name: Set(name),
                slug: Set(slug),
            }
            .insert(&*self.db)
            .await
            .map(TaxonomyEntry::from),
            TaxonomyKind::Genre => genres::ActiveModel {
                id: NotSet,
                name: Set(name),
                slug: Set(slug),
            }
            .insert(&*self.db)
            .await
            .map(TaxonomyEntry::from),
        };
        entry.map_err(map_db_err)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<(), TaxonomyRepositoryError> {
        let deleted = match self.kind {
            TaxonomyKind::Category => {
                delete_entry::<categories::Entity>(&self.db, categories::Column::Slug, slug).await
            }
            TaxonomyKind::Genre => {
                delete_entry::<genres::Entity>(&self.db, genres::Column::Slug, slug).await
            }
        }
        .map_err(map_db_err)?;

        if deleted == 0 {
            return Err(TaxonomyRepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::Value;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
    }

    fn genre(id: i32, name: &str, slug: &str) -> genres::Model {
        genres::Model {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    fn repo(db: MockDatabase, kind: TaxonomyKind) -> TaxonomyRepositoryPostgres {
        TaxonomyRepositoryPostgres::new(Arc::new(db.into_connection()), kind)
    }

    #[tokio::test]
    async fn list_genres_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(2)]])
            .append_query_results(vec![vec![genre(2, "Comedy", "comedy"), genre(1, "Drama", "drama")]]);

        let page = repo(db, TaxonomyKind::Genre)
            .list(Some("d".into()), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[1].slug, "drama");
    }

    #[tokio::test]
    async fn find_by_slugs_skips_query_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let found = repo(db, TaxonomyKind::Category).find_by_slugs(&[]).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn create_category_returns_entry() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results(vec![vec![
            categories::Model {
                id: 5,
                name: "Films".into(),
                slug: "movie".into(),
            },
        ]]);

        let entry = repo(db, TaxonomyKind::Category)
            .create("Films".into(), "movie".into())
            .await
            .unwrap();

        assert_eq!(
            entry,
            TaxonomyEntry {
                id: 5,
                name: "Films".into(),
                slug: "movie".into()
            }
        );
    }

    #[tokio::test]
    async fn duplicate_slug_maps_to_slug_taken() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_errors(vec![
            DbErr::Custom(
                "duplicate key value violates unique constraint \"genres_slug_key\"".into(),
            ),
        ]);

        let result = repo(db, TaxonomyKind::Genre)
            .create("Drama".into(), "drama".into())
            .await;

        assert!(matches!(result, Err(TaxonomyRepositoryError::SlugTaken)));
    }

    #[tokio::test]
    async fn delete_missing_slug_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);

        let result = repo(db, TaxonomyKind::Genre).delete_by_slug("ghost").await;

        assert!(matches!(result, Err(TaxonomyRepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn delete_existing_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);

        assert!(repo(db, TaxonomyKind::Category)
            .delete_by_slug("movie")
            .await
            .is_ok());
    }
}
