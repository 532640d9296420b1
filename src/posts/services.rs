use tracing::{info, warn};
use uuid::Uuid;

use super::model::{Comment, Like, Post};
use crate::auth::repo_types::User;
use crate::error::AppError;
use crate::policy::ensure_owner;
use crate::store::Store;
use crate::validation::{present, Checks};

pub(crate) const POST_NOT_FOUND: &str = "Post not found";
pub(crate) const COMMENT_NOT_FOUND: &str = "Comment does not exist";

pub fn validate_text(text: Option<String>) -> Result<String, AppError> {
    let text = present(text);
    Checks::new()
        .check(text.is_some(), "text", "Text is required")
        .finish()?;
    Ok(text.unwrap_or_default())
}

/// The author is looked up here because the token only carries the id.
async fn author(store: &dyn Store, user_id: Uuid) -> Result<User, AppError> {
    store.find_user_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject has no account");
        AppError::NotFound("User not found")
    })
}

async fn existing_post(store: &dyn Store, post_id: Uuid) -> Result<Post, AppError> {
    store
        .find_post(post_id)
        .await?
        .ok_or(AppError::NotFound(POST_NOT_FOUND))
}

pub async fn create(store: &dyn Store, user_id: Uuid, text: String) -> Result<Post, AppError> {
    let user = author(store, user_id).await?;
    let post = Post::new(&user, text);
    store.insert_post(&post).await?;
    info!(user_id = %user_id, post_id = %post.id, "post created");
    Ok(post)
}

pub async fn get(store: &dyn Store, post_id: Uuid) -> Result<Post, AppError> {
    existing_post(store, post_id).await
}

pub async fn delete(store: &dyn Store, user_id: Uuid, post_id: Uuid) -> Result<(), AppError> {
    let post = ensure_owner(store.find_post(post_id).await?, user_id, POST_NOT_FOUND)?;
    if !store.delete_post(post.id).await? {
        return Err(AppError::NotFound(POST_NOT_FOUND));
    }
    info!(user_id = %user_id, post_id = %post_id, "post deleted");
    Ok(())
}

/// Likes or unlikes; either way the resulting like list is returned.
pub async fn toggle_like(store: &dyn Store, user_id: Uuid, post_id: Uuid) -> Result<Vec<Like>, AppError> {
    let mut post = existing_post(store, post_id).await?;
    let liked = post.toggle_like(user_id);
    store.save_post(&post).await?;
    info!(user_id = %user_id, post_id = %post_id, liked, "like toggled");
    Ok(post.likes)
}

pub async fn add_comment(
    store: &dyn Store,
    user_id: Uuid,
    post_id: Uuid,
    text: String,
) -> Result<Vec<Comment>, AppError> {
    let mut post = existing_post(store, post_id).await?;
    let user = author(store, user_id).await?;
    post.add_comment(&user, text);
    store.save_post(&post).await?;
    Ok(post.comments)
}

pub async fn remove_comment(
    store: &dyn Store,
    user_id: Uuid,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<Vec<Comment>, AppError> {
    let mut post = existing_post(store, post_id).await?;
    let comment = ensure_owner(post.comment(comment_id), user_id, COMMENT_NOT_FOUND)?;
    let comment_id = comment.id;
    post.remove_comment(comment_id);
    store.save_post(&post).await?;
    Ok(post.comments)
}
