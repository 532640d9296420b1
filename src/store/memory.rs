use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::repo_types::{User, UserSummary};
use crate::posts::model::Post;
use crate::profiles::model::Profile;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    posts: Vec<Post>,
}

/// In-process store for router tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.posts.retain(|p| p.user_id != user_id);
        inner.profiles.remove(&user_id);
        inner.users.remove(&user_id);
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.inner.read().await.profiles.get(&user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<(Profile, UserSummary)>, StoreError> {
        let inner = self.inner.read().await;
        let mut out: Vec<(Profile, UserSummary)> = inner
            .profiles
            .values()
            .filter_map(|p| {
                let owner = inner.users.get(&p.user_id)?;
                Some((p.clone(), UserSummary::from(owner)))
            })
            .collect();
        out.sort_by_key(|(p, _)| p.created_at);
        Ok(out)
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .profiles
            .entry(profile.user_id)
            // the row keeps its original id and creation time on overwrite
            .and_modify(|existing| {
                let (id, created_at) = (existing.id, existing.created_at);
                *existing = profile.clone();
                existing.id = id;
                existing.created_at = created_at;
            })
            .or_insert_with(|| profile.clone());
        Ok(())
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        self.inner.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.inner.read().await.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.posts.iter_mut().find(|p| p.id == post.id) {
            existing.likes = post.likes.clone();
            existing.comments = post.comments.clone();
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        Ok(inner.posts.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: email.into(),
            avatar: String::new(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn email_is_unique_and_case_sensitive() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.com")).await.unwrap();
        assert!(matches!(
            store.insert_user(&user("a@x.com")).await,
            Err(StoreError::Duplicate("email"))
        ));
        store.insert_user(&user("A@x.com")).await.unwrap();
    }
}
