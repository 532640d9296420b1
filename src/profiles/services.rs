use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{EducationRequest, ExperienceRequest, ProfileRequest};
use super::model::{Education, Experience, Profile, ProfilePatch, ProfileView, Social};
use crate::auth::repo_types::UserSummary;
use crate::error::{AppError, FieldError};
use crate::policy::ensure_owner;
use crate::store::Store;
use crate::validation::{parse_date, present, Checks};

pub(crate) const PROFILE_NOT_FOUND: &str = "There is no profile for this user";

const FROM_REQUIRED: FieldError = FieldError {
    param: "from",
    msg: "From date is required",
};

/// Validates a submission and turns it into an explicit patch.
pub fn build_patch(req: ProfileRequest) -> Result<ProfilePatch, AppError> {
    let skills = req.skills.map(|s| s.into_list()).filter(|s| !s.is_empty());
    Checks::new()
        .required(req.status.as_deref(), "status", "Status is required")
        .check(skills.is_some(), "skills", "Skills are required")
        .finish()?;

    Ok(ProfilePatch {
        company: present(req.company),
        website: present(req.website),
        location: present(req.location),
        bio: present(req.bio),
        status: present(req.status),
        githubusername: present(req.githubusername),
        skills,
        social: Social {
            youtube: present(req.youtube),
            twitter: present(req.twitter),
            facebook: present(req.facebook),
            linkedin: present(req.linkedin),
            instagram: present(req.instagram),
        },
    })
}

pub fn build_experience(req: ExperienceRequest) -> Result<Experience, AppError> {
    let from = req.from.as_deref().and_then(parse_date);
    let to = present(req.to);
    let to_date = to.as_deref().and_then(parse_date);
    Checks::new()
        .required(req.title.as_deref(), "title", "Title is required")
        .required(req.company.as_deref(), "company", "Company is required")
        .check(from.is_some(), FROM_REQUIRED.param, FROM_REQUIRED.msg)
        .check(to.is_none() || to_date.is_some(), "to", "To date must be a valid date")
        .finish()?;

    let from = from.ok_or(AppError::Validation(vec![FROM_REQUIRED]))?;
    Ok(Experience {
        id: Uuid::new_v4(),
        title: present(req.title).unwrap_or_default(),
        company: present(req.company).unwrap_or_default(),
        location: present(req.location),
        from,
        to: to_date,
        current: req.current,
        description: present(req.description),
    })
}

pub fn build_education(req: EducationRequest) -> Result<Education, AppError> {
    let from = req.from.as_deref().and_then(parse_date);
    let to = present(req.to);
    let to_date = to.as_deref().and_then(parse_date);
    Checks::new()
        .required(req.school.as_deref(), "school", "School is required")
        .required(req.degree.as_deref(), "degree", "Degree is required")
        .required(req.fieldofstudy.as_deref(), "fieldofstudy", "Field of study is required")
        .check(from.is_some(), FROM_REQUIRED.param, FROM_REQUIRED.msg)
        .check(to.is_none() || to_date.is_some(), "to", "To date must be a valid date")
        .finish()?;

    let from = from.ok_or(AppError::Validation(vec![FROM_REQUIRED]))?;
    Ok(Education {
        id: Uuid::new_v4(),
        school: present(req.school).unwrap_or_default(),
        degree: present(req.degree).unwrap_or_default(),
        fieldofstudy: present(req.fieldofstudy).unwrap_or_default(),
        from,
        to: to_date,
        current: req.current,
        description: present(req.description),
    })
}

/// Creates the requester's profile or merges the patch into the existing one.
pub async fn upsert(store: &dyn Store, user_id: Uuid, patch: ProfilePatch) -> Result<Profile, AppError> {
    if store.find_user_by_id(user_id).await?.is_none() {
        warn!(user_id = %user_id, "token subject has no account");
        return Err(AppError::NotFound("User not found"));
    }
    let profile = match store.find_profile(user_id).await? {
        Some(mut existing) => {
            existing.merge(patch);
            existing
        }
        None => Profile::create(user_id, patch),
    };
    store.save_profile(&profile).await?;
    info!(user_id = %user_id, profile_id = %profile.id, "profile saved");
    Ok(profile)
}

/// Profile of `user_id` with the owner's name and avatar attached.
pub async fn view(store: &dyn Store, user_id: Uuid, missing: &'static str) -> Result<ProfileView, AppError> {
    let profile = store.find_profile(user_id).await?.ok_or(AppError::NotFound(missing))?;
    let owner = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound(missing))?;
    Ok(ProfileView {
        profile,
        user: UserSummary::from(&owner),
    })
}

/// Loads the requester's own profile for a nested mutation.
async fn own_profile(store: &dyn Store, user_id: Uuid) -> Result<Profile, AppError> {
    let profile = store.find_profile(user_id).await?;
    ensure_owner(profile, user_id, PROFILE_NOT_FOUND)
}

pub async fn add_experience(store: &dyn Store, user_id: Uuid, entry: Experience) -> Result<Profile, AppError> {
    let mut profile = own_profile(store, user_id).await?;
    profile.add_experience(entry);
    store.save_profile(&profile).await?;
    Ok(profile)
}

pub async fn remove_experience(store: &dyn Store, user_id: Uuid, exp_id: Uuid) -> Result<Profile, AppError> {
    let mut profile = own_profile(store, user_id).await?;
    if !profile.remove_experience(exp_id) {
        return Err(AppError::NotFound("Experience not found"));
    }
    store.save_profile(&profile).await?;
    Ok(profile)
}

pub async fn add_education(store: &dyn Store, user_id: Uuid, entry: Education) -> Result<Profile, AppError> {
    let mut profile = own_profile(store, user_id).await?;
    profile.add_education(entry);
    store.save_profile(&profile).await?;
    Ok(profile)
}

pub async fn remove_education(store: &dyn Store, user_id: Uuid, edu_id: Uuid) -> Result<Profile, AppError> {
    let mut profile = own_profile(store, user_id).await?;
    if !profile.remove_education(edu_id) {
        return Err(AppError::NotFound("Education not found"));
    }
    store.save_profile(&profile).await?;
    Ok(profile)
}

pub async fn delete_account(store: &dyn Store, user_id: Uuid) -> Result<(), AppError> {
    store.delete_account(user_id).await?;
    info!(user_id = %user_id, "account deleted");
    Ok(())
}
