use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::sea_orm_entity::{categories, genres, title_genres, titles};
use crate::catalog::application::domain::entities::{TaxonomyEntry, TitleId, TitleView};
use crate::catalog::application::ports::outgoing::{TitleFilter, TitleQuery, TitleQueryError};
use crate::shared::pagination::{PageRequest, PageResult};
use crate::shared::search::contains_ci;

/// Mean review score, `NULL` for titles without reviews.
const RATING_EXPR: &str = r#"CAST(AVG("reviews"."score") AS DOUBLE PRECISION)"#;

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
struct TitleRow {
    id: i32,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<i32>,
    rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
struct GenreLinkRow {
    title_id: i32,
    id: i32,
    name: String,
    slug: String,
}

#[derive(Clone, Debug)]
pub struct TitleQueryPostgres {
    db: Arc<DatabaseConnection>,
}

impl TitleQueryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn filtered(filter: &TitleFilter) -> Select<titles::Entity> {
        let mut query = titles::Entity::find();

        if let Some(slug) = filter.category.as_deref() {
            query = query.filter(
                titles::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(categories::Column::Id)
                        .from(categories::Entity)
                        .and_where(categories::Column::Slug.eq(slug))
                        .to_owned(),
                ),
            );
        }

        if let Some(slug) = filter.genre.as_deref() {
            query = query.filter(
                titles::Column::Id.in_subquery(
                    Query::select()
                        .column((title_genres::Entity, title_genres::Column::TitleId))
                        .from(title_genres::Entity)
                        .inner_join(
                            genres::Entity,
                            Expr::col((genres::Entity, genres::Column::Id))
                                .equals((title_genres::Entity, title_genres::Column::GenreId)),
                        )
                        .and_where(Expr::col((genres::Entity, genres::Column::Slug)).eq(slug))
                        .to_owned(),
                ),
            );
        }

        if let Some(name) = filter.name.as_deref() {
            query = query.filter(contains_ci(titles::Column::Name, name));
        }

        if let Some(year) = filter.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        query
    }

    /// One aggregated pass: titles left-joined with their reviews.
    fn with_rating(query: Select<titles::Entity>) -> Select<titles::Entity> {
        query
            .select_only()
            .column(titles::Column::Id)
            .column(titles::Column::Name)
            .column(titles::Column::Year)
            .column(titles::Column::Description)
            .column(titles::Column::CategoryId)
            .column_as(Expr::cust(RATING_EXPR), "rating")
            .join(JoinType::LeftJoin, titles::Relation::Reviews.def())
            .group_by(titles::Column::Id)
    }

    /// Attaches categories and genres with one query each.
    async fn decorate(&self, rows: Vec<TitleRow>) -> Result<Vec<TitleView>, DbErr> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut category_ids: Vec<i32> = rows.iter().filter_map(|r| r.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let mut categories_by_id: HashMap<i32, TaxonomyEntry> = HashMap::new();
        if !category_ids.is_empty() {
            for model in categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(&*self.db)
                .await?
            {
                categories_by_id.insert(model.id, model.into());
            }
        }

        let title_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let links = genres::Entity::find()
            .select_only()
            .column_as(title_genres::Column::TitleId, "title_id")
            .column(genres::Column::Id)
            .column(genres::Column::Name)
            .column(genres::Column::Slug)
            .join(JoinType::InnerJoin, genres::Relation::TitleGenres.def())
            .filter(title_genres::Column::TitleId.is_in(title_ids))
            .order_by_asc(genres::Column::Name)
            .into_model::<GenreLinkRow>()
            .all(&*self.db)
            .await?;

        let mut genres_by_title: HashMap<i32, Vec<TaxonomyEntry>> = HashMap::new();
        for link in links {
            genres_by_title
                .entry(link.title_id)
                .or_default()
                .push(TaxonomyEntry {
                    id: link.id,
                    name: link.name,
                    slug: link.slug,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| TitleView {
                id: row.id,
                genres: genres_by_title.remove(&row.id).unwrap_or_default(),
                category: row
                    .category_id
                    .and_then(|id| categories_by_id.get(&id).cloned()),
                name: row.name,
                year: row.year,
                rating: row.rating,
                description: row.description,
            })
            .collect())
    }
}

fn map_db_err(e: DbErr) -> TitleQueryError {
    TitleQueryError::DatabaseError(e.to_string())
}

#[async_trait]
impl TitleQuery for TitleQueryPostgres {
    async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<PageResult<TitleView>, TitleQueryError> {
        let query = Self::filtered(&filter);

        let total = query.clone().count(&*self.db).await.map_err(map_db_err)?;
        if total == 0 {
            return Ok(PageResult::empty(page));
        }

        let rows = Self::with_rating(query)
            .order_by_desc(titles::Column::Year)
            .order_by_asc(titles::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .into_model::<TitleRow>()
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        let items = self.decorate(rows).await.map_err(map_db_err)?;
        Ok(PageResult::new(items, page, total))
    }

    async fn find_by_id(&self, id: TitleId) -> Result<Option<TitleView>, TitleQueryError> {
        let row = Self::with_rating(titles::Entity::find().filter(titles::Column::Id.eq(id)))
            .into_model::<TitleRow>()
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut views = self.decorate(vec![row]).await.map_err(map_db_err)?;
        Ok(views.pop())
    }

    async fn exists(&self, id: TitleId) -> Result<bool, TitleQueryError> {
        let found = titles::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::sea_query::Value;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
    }

    fn title_row(id: i32, name: &str, category_id: Option<i32>, rating: Option<f64>) -> BTreeMap<String, Value> {
        btreemap! {
            "id".to_string() => Value::Int(Some(id)),
            "name".to_string() => Value::String(Some(Box::new(name.to_string()))),
            "year".to_string() => Value::Int(Some(1995)),
            "description".to_string() => Value::String(None),
            "category_id".to_string() => Value::Int(category_id),
            "rating".to_string() => Value::Double(rating),
        }
    }

    fn genre_link(title_id: i32, id: i32, slug: &str) -> BTreeMap<String, Value> {
        btreemap! {
            "title_id".to_string() => Value::Int(Some(title_id)),
            "id".to_string() => Value::Int(Some(id)),
            "name".to_string() => Value::String(Some(Box::new(slug.to_uppercase()))),
            "slug".to_string() => Value::String(Some(Box::new(slug.to_string()))),
        }
    }

    fn category(id: i32, slug: &str) -> categories::Model {
        categories::Model {
            id,
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn list_attaches_rating_category_and_genres() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(2)]])
            .append_query_results(vec![vec![
                title_row(1, "Heat", Some(10), Some(7.0)),
                title_row(2, "Ronin", None, None),
            ]])
            .append_query_results(vec![vec![category(10, "movie")]])
            .append_query_results(vec![vec![
                genre_link(1, 100, "crime"),
                genre_link(1, 101, "drama"),
                genre_link(2, 100, "crime"),
            ]])
            .into_connection();

        let page = TitleQueryPostgres::new(Arc::new(db))
            .list(TitleFilter::default(), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        let heat = &page.items[0];
        assert_eq!(heat.rating, Some(7.0));
        assert_eq!(heat.category.as_ref().unwrap().slug, "movie");
        assert_eq!(heat.genres.len(), 2);

        let ronin = &page.items[1];
        assert_eq!(ronin.rating, None);
        assert_eq!(ronin.category, None);
        assert_eq!(ronin.genres[0].slug, "crime");
    }

    #[tokio::test]
    async fn list_skips_page_query_when_nothing_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(0)]])
            .into_connection();

        let page = TitleQueryPostgres::new(Arc::new(db))
            .list(
                TitleFilter {
                    genre: Some("western".into()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();

        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn find_by_id_without_category_runs_two_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![title_row(3, "Dune", None, Some(8.5))]])
            .append_query_results(vec![Vec::<BTreeMap<String, Value>>::new()])
            .into_connection();

        let view = TitleQueryPostgres::new(Arc::new(db))
            .find_by_id(3)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.name, "Dune");
        assert_eq!(view.rating, Some(8.5));
        assert!(view.genres.is_empty());
    }

    #[tokio::test]
    async fn find_by_id_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<BTreeMap<String, Value>>::new()])
            .into_connection();

        assert!(TitleQueryPostgres::new(Arc::new(db))
            .find_by_id(9)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn database_error_is_mapped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("connection reset".into())])
            .into_connection();

        let result = TitleQueryPostgres::new(Arc::new(db)).exists(1).await;

        assert!(matches!(result, Err(TitleQueryError::DatabaseError(_))));
    }

    #[test]
    fn rating_query_left_joins_and_groups() {
        use sea_orm::QueryTrait;

        let sql = TitleQueryPostgres::with_rating(TitleQueryPostgres::filtered(&TitleFilter {
            category: Some("movie".into()),
            ..Default::default()
        }))
        .build(DatabaseBackend::Postgres)
        .to_string();

        assert!(sql.contains(r#"LEFT JOIN "reviews""#));
        assert!(sql.contains(r#"GROUP BY "titles"."id""#));
        assert!(sql.contains("AVG"));
        assert!(sql.contains(r#""categories"."slug" = 'movie'"#));
    }
}
