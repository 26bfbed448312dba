use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::in_memory_users::InMemoryUsers;
use crate::auth::application::domain::entities::UserId;
use crate::catalog::application::domain::entities::{
    TaxonomyEntry, TaxonomyKind, TitleId, TitleView,
};
use crate::catalog::application::ports::outgoing::{
    NewTitleData, TaxonomyRepository, TaxonomyRepositoryError, TitleChanges, TitleFilter,
    TitleQuery, TitleQueryError, TitleRepository, TitleRepositoryError,
};
use crate::review::application::domain::entities::{Comment, CommentId, Review, ReviewId};
use crate::review::application::ports::outgoing::{
    CommentRepository, CommentRepositoryError, NewCommentData, NewReviewData, ReviewChanges,
    ReviewRepository, ReviewRepositoryError,
};
use crate::shared::pagination::{PageRequest, PageResult};

#[derive(Debug, Clone)]
struct TitleRecord {
    id: TitleId,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<i32>,
    genre_ids: Vec<i32>,
}

#[derive(Default)]
struct State {
    categories: Vec<TaxonomyEntry>,
    genres: Vec<TaxonomyEntry>,
    titles: Vec<TitleRecord>,
    reviews: Vec<Review>,
    comments: Vec<Comment>,
    last_id: i32,
    reject_reviews: bool,
    error: Option<String>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn entries(&self, kind: TaxonomyKind) -> &Vec<TaxonomyEntry> {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Genre => &self.genres,
        }
    }

    fn entries_mut(&mut self, kind: TaxonomyKind) -> &mut Vec<TaxonomyEntry> {
        match kind {
            TaxonomyKind::Category => &mut self.categories,
            TaxonomyKind::Genre => &mut self.genres,
        }
    }

    fn slug_id(&self, kind: TaxonomyKind, slug: &str) -> Option<i32> {
        self.entries(kind).iter().find(|e| e.slug == slug).map(|e| e.id)
    }

    fn rating(&self, title_id: TitleId) -> Option<f64> {
        let scores: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .map(|r| r.score as f64)
            .collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    fn view(&self, title: &TitleRecord) -> TitleView {
        TitleView {
            id: title.id,
            name: title.name.clone(),
            year: title.year,
            rating: self.rating(title.id),
            description: title.description.clone(),
            genres: title
                .genre_ids
                .iter()
                .filter_map(|id| self.genres.iter().find(|g| g.id == *id).cloned())
                .collect(),
            category: title
                .category_id
                .and_then(|id| self.categories.iter().find(|c| c.id == id).cloned()),
        }
    }

    fn remove_review(&mut self, review_id: ReviewId) {
        self.reviews.retain(|r| r.id != review_id);
        self.comments.retain(|c| c.review_id != review_id);
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> PageResult<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    PageResult::new(items, page, total)
}

/// Catalog and review storage in one shared state, so that deletes cascade
/// and titles report the mean of their reviews the way the database does.
#[derive(Clone, Default)]
pub struct InMemoryContent {
    state: Arc<Mutex<State>>,
    users: InMemoryUsers,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authors are resolved to usernames through `users`.
    pub fn with_users(users: InMemoryUsers) -> Self {
        Self {
            state: Arc::default(),
            users,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Fails with the configured error, if any.
    fn check(&self) -> Result<(), String> {
        match &self.lock().error {
            Some(msg) => Err(msg.clone()),
            None => Ok(()),
        }
    }

    fn author_name(&self, author_id: UserId) -> String {
        self.users
            .get(author_id)
            .map(|user| user.username)
            .unwrap_or_else(|| author_id.value().to_string())
    }

    pub fn taxonomy(&self, kind: TaxonomyKind) -> InMemoryTaxonomy {
        InMemoryTaxonomy {
            content: self.clone(),
            kind,
        }
    }

    pub fn add_taxonomy(&self, kind: TaxonomyKind, name: &str, slug: &str) -> TaxonomyEntry {
        let mut state = self.lock();
        let entry = TaxonomyEntry {
            id: state.next_id(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.entries_mut(kind).push(entry.clone());
        entry
    }

    pub fn add_title(&self, name: &str, year: i32) -> TitleId {
        let mut state = self.lock();
        let id = state.next_id();
        state.titles.push(TitleRecord {
            id,
            name: name.to_string(),
            year,
            description: None,
            category_id: None,
            genre_ids: Vec::new(),
        });
        id
    }

    pub fn title_count(&self) -> usize {
        self.lock().titles.len()
    }

    pub fn add_review(&self, title_id: TitleId, author_id: UserId, score: i16) -> ReviewId {
        let author = self.author_name(author_id);
        let mut state = self.lock();
        let id = state.next_id();
        state.reviews.push(Review {
            id,
            title_id,
            author_id,
            author,
            text: format!("Review {}", id),
            score,
            pub_date: Utc::now(),
        });
        id
    }

    /// Review by a throwaway author, for rating checks.
    pub fn add_review_score(&self, title_id: TitleId, score: i16) {
        self.add_review(title_id, UserId::new(), score);
    }

    pub fn rating(&self, title_id: TitleId) -> Option<f64> {
        self.lock().rating(title_id)
    }

    /// Every review insert fails as if the unique constraint fired.
    pub fn reject_reviews_as_duplicate(&self) {
        self.lock().reject_reviews = true;
    }

    pub fn fail_all(&self, msg: &str) {
        self.lock().error = Some(msg.to_string());
    }
}

// ──── catalog ────

/// One kind of taxonomy over the shared content state.
#[derive(Clone)]
pub struct InMemoryTaxonomy {
    content: InMemoryContent,
    kind: TaxonomyKind,
}

#[async_trait]
impl TaxonomyRepository for InMemoryTaxonomy {
    fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<PageResult<TaxonomyEntry>, TaxonomyRepositoryError> {
        self.content
            .check()
            .map_err(TaxonomyRepositoryError::DatabaseError)?;

        let needle = search.map(|s| s.to_lowercase());
        let mut entries: Vec<TaxonomyEntry> = self
            .content
            .lock()
            .entries(self.kind)
            .iter()
            .filter(|e| {
                needle
                    .as_deref()
                    .map_or(true, |n| e.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(paginate(entries, page))
    }

    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyRepositoryError> {
        self.content
            .check()
            .map_err(TaxonomyRepositoryError::DatabaseError)?;

        Ok(self
            .content
            .lock()
            .entries(self.kind)
            .iter()
            .filter(|e| slugs.contains(&e.slug))
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        name: String,
        slug: String,
    ) -> Result<TaxonomyEntry, TaxonomyRepositoryError> {
        self.content
            .check()
            .map_err(TaxonomyRepositoryError::DatabaseError)?;

        let mut state = self.content.lock();
        if state.slug_id(self.kind, &slug).is_some() {
            return Err(TaxonomyRepositoryError::SlugTaken);
        }
        let entry = TaxonomyEntry {
            id: state.next_id(),
            name,
            slug,
        };
        state.entries_mut(self.kind).push(entry.clone());
        Ok(entry)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<(), TaxonomyRepositoryError> {
        self.content
            .check()
            .map_err(TaxonomyRepositoryError::DatabaseError)?;

        let mut state = self.content.lock();
        let id = state
            .slug_id(self.kind, slug)
            .ok_or(TaxonomyRepositoryError::NotFound)?;
        state.entries_mut(self.kind).retain(|e| e.id != id);

        for title in state.titles.iter_mut() {
            match self.kind {
                TaxonomyKind::Category if title.category_id == Some(id) => title.category_id = None,
                TaxonomyKind::Genre => title.genre_ids.retain(|g| *g != id),
                _ => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TitleQuery for InMemoryContent {
    async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<PageResult<TitleView>, TitleQueryError> {
        self.check().map_err(TitleQueryError::DatabaseError)?;

        let state = self.lock();
        let category_id = filter
            .category
            .as_deref()
            .map(|slug| state.slug_id(TaxonomyKind::Category, slug));
        let genre_id = filter
            .genre
            .as_deref()
            .map(|slug| state.slug_id(TaxonomyKind::Genre, slug));
        let name = filter.name.as_deref().map(|n| n.trim().to_lowercase());

        let mut matching: Vec<&TitleRecord> = state
            .titles
            .iter()
            .filter(|t| category_id.map_or(true, |id| id.is_some() && t.category_id == id))
            .filter(|t| genre_id.map_or(true, |id| id.is_some_and(|g| t.genre_ids.contains(&g))))
            .filter(|t| name.as_deref().map_or(true, |n| t.name.to_lowercase().contains(n)))
            .filter(|t| filter.year.map_or(true, |y| t.year == y))
            .collect();
        matching.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.name.cmp(&b.name)));

        let views = matching.into_iter().map(|t| state.view(t)).collect();
        Ok(paginate(views, page))
    }

    async fn find_by_id(&self, id: TitleId) -> Result<Option<TitleView>, TitleQueryError> {
        self.check().map_err(TitleQueryError::DatabaseError)?;

        let state = self.lock();
        Ok(state.titles.iter().find(|t| t.id == id).map(|t| state.view(t)))
    }

    async fn exists(&self, id: TitleId) -> Result<bool, TitleQueryError> {
        self.check().map_err(TitleQueryError::DatabaseError)?;
        Ok(self.lock().titles.iter().any(|t| t.id == id))
    }
}

#[async_trait]
impl TitleRepository for InMemoryContent {
    async fn create(&self, data: NewTitleData) -> Result<TitleId, TitleRepositoryError> {
        self.check().map_err(TitleRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        let id = state.next_id();
        state.titles.push(TitleRecord {
            id,
            name: data.name,
            year: data.year,
            description: data.description,
            category_id: data.category_id,
            genre_ids: data.genre_ids,
        });
        Ok(id)
    }

    async fn update(&self, id: TitleId, changes: TitleChanges) -> Result<(), TitleRepositoryError> {
        self.check().map_err(TitleRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        let title = state
            .titles
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TitleRepositoryError::NotFound)?;

        if let Some(name) = changes.name {
            title.name = name;
        }
        if let Some(year) = changes.year {
            title.year = year;
        }
        if let Some(description) = changes.description {
            title.description = description;
        }
        if let Some(category_id) = changes.category_id {
            title.category_id = category_id;
        }
        if let Some(genre_ids) = changes.genre_ids {
            title.genre_ids = genre_ids;
        }
        Ok(())
    }

    async fn delete(&self, id: TitleId) -> Result<(), TitleRepositoryError> {
        self.check().map_err(TitleRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        if !state.titles.iter().any(|t| t.id == id) {
            return Err(TitleRepositoryError::NotFound);
        }
        state.titles.retain(|t| t.id != id);

        let review_ids: Vec<ReviewId> = state
            .reviews
            .iter()
            .filter(|r| r.title_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in review_ids {
            state.remove_review(review_id);
        }
        Ok(())
    }
}

// ──── reviews ────

#[async_trait]
impl ReviewRepository for InMemoryContent {
    async fn list_for_title(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> Result<PageResult<Review>, ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        let mut reviews: Vec<Review> = self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));

        Ok(paginate(reviews, page))
    }

    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.id == review_id && r.title_id == title_id)
            .cloned())
    }

    async fn exists_for_author(
        &self,
        title_id: TitleId,
        author_id: UserId,
    ) -> Result<bool, ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        Ok(self
            .lock()
            .reviews
            .iter()
            .any(|r| r.title_id == title_id && r.author_id == author_id))
    }

    async fn create(&self, data: NewReviewData) -> Result<Review, ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        let author = self.author_name(data.author_id);
        let mut state = self.lock();
        let duplicate = state
            .reviews
            .iter()
            .any(|r| r.title_id == data.title_id && r.author_id == data.author_id);
        if state.reject_reviews || duplicate {
            return Err(ReviewRepositoryError::AlreadyReviewed);
        }

        let review = Review {
            id: state.next_id(),
            title_id: data.title_id,
            author_id: data.author_id,
            author,
            text: data.text,
            score: data.score,
            pub_date: Utc::now(),
        };
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn update(
        &self,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(ReviewRepositoryError::NotFound)?;

        if let Some(text) = changes.text {
            review.text = text;
        }
        if let Some(score) = changes.score {
            review.score = score;
        }
        Ok(review.clone())
    }

    async fn delete(&self, review_id: ReviewId) -> Result<(), ReviewRepositoryError> {
        self.check().map_err(ReviewRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        if !state.reviews.iter().any(|r| r.id == review_id) {
            return Err(ReviewRepositoryError::NotFound);
        }
        state.remove_review(review_id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryContent {
    async fn list_for_review(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> Result<PageResult<Comment>, CommentRepositoryError> {
        self.check().map_err(CommentRepositoryError::DatabaseError)?;

        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));

        Ok(paginate(comments, page))
    }

    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        self.check().map_err(CommentRepositoryError::DatabaseError)?;

        Ok(self
            .lock()
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.review_id == review_id)
            .cloned())
    }

    async fn create(&self, data: NewCommentData) -> Result<Comment, CommentRepositoryError> {
        self.check().map_err(CommentRepositoryError::DatabaseError)?;

        let author = self.author_name(data.author_id);
        let mut state = self.lock();
        let comment = Comment {
            id: state.next_id(),
            review_id: data.review_id,
            author_id: data.author_id,
            author,
            text: data.text,
            pub_date: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(
        &self,
        comment_id: CommentId,
        text: String,
    ) -> Result<Comment, CommentRepositoryError> {
        self.check().map_err(CommentRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or(CommentRepositoryError::NotFound)?;
        comment.text = text;
        Ok(comment.clone())
    }

    async fn delete(&self, comment_id: CommentId) -> Result<(), CommentRepositoryError> {
        self.check().map_err(CommentRepositoryError::DatabaseError)?;

        let mut state = self.lock();
        if !state.comments.iter().any(|c| c.id == comment_id) {
            return Err(CommentRepositoryError::NotFound);
        }
        state.comments.retain(|c| c.id != comment_id);
        Ok(())
    }
}
