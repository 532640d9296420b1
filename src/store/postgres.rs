use std::{future::Future, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::repo_types::{User, UserSummary};
use crate::posts::model::{Post, PostRow};
use crate::profiles::model::{Profile, ProfileRow};

const USER_COLUMNS: &str = "id, name, email, avatar, password_hash, created_at";
const PROFILE_COLUMNS: &str = "p.id, p.user_id, p.company, p.website, p.location, p.bio, \
     p.status, p.githubusername, p.skills, p.social, p.experience, p.education, p.created_at";
const POST_COLUMNS: &str = "id, user_id, text, name, avatar, likes, comments, created_at";

#[derive(FromRow)]
struct ProfileWithOwnerRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    owner_name: String,
    owner_avatar: String,
}

/// PostgreSQL-backed store. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub async fn connect(database_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db, timeout })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(op)),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.bounded(
            "find_user_by_email",
            sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.db),
        )
        .await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.bounded(
            "find_user_by_id",
            sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.db),
        )
        .await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let res = self
            .bounded(
                "insert_user",
                sqlx::query(
                    r#"
                    INSERT INTO users (id, name, email, avatar, password_hash, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.avatar)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .execute(&self.db),
            )
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(StoreError::Backend(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                Err(StoreError::Duplicate("email"))
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), StoreError> {
        // profiles and posts go with the user through ON DELETE CASCADE
        self.bounded(
            "delete_account",
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.user_id = $1");
        let row = self
            .bounded(
                "find_profile",
                sqlx::query_as::<_, ProfileRow>(&sql)
                    .bind(user_id)
                    .fetch_optional(&self.db),
            )
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn list_profiles(&self) -> Result<Vec<(Profile, UserSummary)>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}, u.name AS owner_name, u.avatar AS owner_avatar
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at ASC
            "#
        );
        let rows = self
            .bounded(
                "list_profiles",
                sqlx::query_as::<_, ProfileWithOwnerRow>(&sql).fetch_all(&self.db),
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                let owner = UserSummary {
                    id: r.profile.user_id,
                    name: r.owner_name,
                    avatar: r.owner_avatar,
                };
                (Profile::from(r.profile), owner)
            })
            .collect())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.bounded(
            "save_profile",
            sqlx::query(
                r#"
                INSERT INTO profiles (id, user_id, company, website, location, bio, status,
                                      githubusername, skills, social, experience, education,
                                      created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (user_id) DO UPDATE SET
                    company = EXCLUDED.company,
                    website = EXCLUDED.website,
                    location = EXCLUDED.location,
                    bio = EXCLUDED.bio,
                    status = EXCLUDED.status,
                    githubusername = EXCLUDED.githubusername,
                    skills = EXCLUDED.skills,
                    social = EXCLUDED.social,
                    experience = EXCLUDED.experience,
                    education = EXCLUDED.education
                "#,
            )
            .bind(profile.id)
            .bind(profile.user_id)
            .bind(&profile.company)
            .bind(&profile.website)
            .bind(&profile.location)
            .bind(&profile.bio)
            .bind(&profile.status)
            .bind(&profile.githubusername)
            .bind(&profile.skills)
            .bind(Json(&profile.social))
            .bind(Json(&profile.experience))
            .bind(Json(&profile.education))
            .bind(profile.created_at)
            .execute(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        self.bounded(
            "insert_post",
            sqlx::query(
                r#"
                INSERT INTO posts (id, user_id, text, name, avatar, likes, comments, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(post.id)
            .bind(post.user_id)
            .bind(&post.text)
            .bind(&post.name)
            .bind(&post.avatar)
            .bind(Json(&post.likes))
            .bind(Json(&post.comments))
            .bind(post.created_at)
            .execute(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC");
        let rows = self
            .bounded(
                "list_posts",
                sqlx::query_as::<_, PostRow>(&sql).fetch_all(&self.db),
            )
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = self
            .bounded(
                "find_post",
                sqlx::query_as::<_, PostRow>(&sql).bind(id).fetch_optional(&self.db),
            )
            .await?;
        Ok(row.map(Post::from))
    }

    async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        self.bounded(
            "save_post",
            sqlx::query("UPDATE posts SET likes = $2, comments = $3 WHERE id = $1")
                .bind(post.id)
                .bind(Json(&post.likes))
                .bind(Json(&post.comments))
                .execute(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = self
            .bounded(
                "delete_post",
                sqlx::query("DELETE FROM posts WHERE id = $1")
                    .bind(id)
                    .execute(&self.db),
            )
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
