use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{User, UserSummary};
use crate::posts::model::Post;
use crate::profiles::model::Profile;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    Duplicate(&'static str),
    #[error("store call `{0}` timed out")]
    Timeout(&'static str),
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Document-style persistence for users, profiles and posts. Each call is a
/// single atomic write or read; whole-document saves are last-write-wins.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `Duplicate("email")` when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    /// Removes the user together with their profile and posts.
    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn list_profiles(&self) -> Result<Vec<(Profile, UserSummary)>, StoreError>;
    /// Inserts or overwrites the profile keyed by its owner.
    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError>;
    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    /// Persists likes and comments of an existing post.
    async fn save_post(&self, post: &Post) -> Result<(), StoreError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;
}
