use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::policy::Owned;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Post {
    /// New post carrying a snapshot of the author's name and avatar.
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Likes the post for `user_id`, or takes the like back if it was already
    /// there. Returns whether the post is liked afterwards.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        match self.likes.iter().position(|l| l.user_id == user_id) {
            Some(idx) => {
                self.likes.remove(idx);
                false
            }
            None => {
                self.likes.insert(0, Like { user_id });
                true
            }
        }
    }

    pub fn add_comment(&mut self, author: &User, text: String) -> &Comment {
        self.comments.insert(
            0,
            Comment {
                id: Uuid::new_v4(),
                user_id: author.id,
                text,
                name: author.name.clone(),
                avatar: author.avatar.clone(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        &self.comments[0]
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn remove_comment(&mut self, comment_id: Uuid) {
        self.comments.retain(|c| c.id != comment_id);
    }
}

#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Json<Vec<Like>>,
    pub comments: Json<Vec<Comment>>,
    pub created_at: OffsetDateTime,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            text: r.text,
            name: r.name,
            avatar: r.avatar,
            likes: r.likes.0,
            comments: r.comments.0,
            created_at: r.created_at,
        }
    }
}
