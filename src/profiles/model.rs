use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::UserSummary;
use crate::policy::Owned;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(with = "iso_date::option")]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(with = "iso_date::option")]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Owned for Profile {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// A profile submission after normalisation. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: Social,
}

impl Profile {
    pub fn create(user_id: Uuid, patch: ProfilePatch) -> Self {
        let mut profile = Self {
            id: Uuid::new_v4(),
            user_id,
            company: None,
            website: None,
            location: None,
            bio: None,
            status: String::new(),
            githubusername: None,
            skills: Vec::new(),
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        profile.merge(patch);
        profile
    }

    /// Supplied fields overwrite, missing ones keep their stored value. Social
    /// links are replaced as one group.
    pub fn merge(&mut self, patch: ProfilePatch) {
        fn keep_or_set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }
        keep_or_set(&mut self.company, patch.company);
        keep_or_set(&mut self.website, patch.website);
        keep_or_set(&mut self.location, patch.location);
        keep_or_set(&mut self.bio, patch.bio);
        keep_or_set(&mut self.githubusername, patch.githubusername);
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
        self.social = patch.social;
    }

    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    /// Returns `false` when no entry carries `id`.
    pub fn remove_experience(&mut self, id: Uuid) -> bool {
        match self.experience.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.experience.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    pub fn remove_education(&mut self, id: Uuid) -> bool {
        match self.education.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.education.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Profile as returned by the read routes, with its owner's name and avatar.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub user: UserSummary,
}

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: Json<Social>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub created_at: OffsetDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            company: r.company,
            website: r.website,
            location: r.location,
            bio: r.bio,
            status: r.status,
            githubusername: r.githubusername,
            skills: r.skills,
            social: r.social.0,
            experience: r.experience.0,
            education: r.education.0,
            created_at: r.created_at,
        }
    }
}
