//! crates/lumina_core/src/profile.rs
//!
//! Owns the single user profile. Its lifecycle is independent of the books:
//! it is created with defaults on first use and only changes through an
//! explicit save.

use serde::Deserialize;
use tracing::info;

use crate::domain::{initials, Preferences, UserProfile, DEFAULT_YEARLY_GOAL};
use crate::error::{LibraryError, LibraryResult};
use crate::persistence::{Persistence, USER_KEY};

const ONBOARDING_TITLE: &str = "Book Enthusiast";
const ONBOARDING_YEARLY_GOAL: u32 = 12;

/// What a new user fills in on first launch. Only the name is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingForm {
    pub name: String,
    pub title: Option<String>,
    pub yearly_goal: Option<u32>,
    pub bio: Option<String>,
}

/// The editable identity fields of the profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ProfileEdit {
    pub name: String,
    pub title: String,
    pub bio: String,
}

pub struct ProfileStore {
    persistence: Persistence,
    profile: UserProfile,
    first_run: bool,
}

impl ProfileStore {
    /// Loads the stored profile, falling back to defaults when none is stored.
    pub async fn open(persistence: Persistence) -> Self {
        let stored: Option<UserProfile> = persistence.load_existing(USER_KEY).await;
        let first_run = stored.is_none();
        Self {
            persistence,
            profile: stored.unwrap_or_default(),
            first_run,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// True until a profile has been saved.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// Validates and persists `profile` as the new singleton.
    pub async fn save(&mut self, mut profile: UserProfile) -> LibraryResult<&UserProfile> {
        profile.name = profile.name.trim().to_string();
        profile.validate()?;
        if !profile.avatar_is_image() {
            profile.avatar = initials(&profile.name);
        }
        self.persistence.save(USER_KEY, &profile).await?;
        self.profile = profile;
        self.first_run = false;
        Ok(&self.profile)
    }

    /// Validates and persists `profile` exactly as given, e.g. from an import.
    pub async fn replace(&mut self, profile: UserProfile) -> LibraryResult<()> {
        profile.validate()?;
        self.persistence.save(USER_KEY, &profile).await?;
        self.profile = profile;
        self.first_run = false;
        Ok(())
    }

    pub async fn complete_onboarding(
        &mut self,
        form: OnboardingForm,
    ) -> LibraryResult<&UserProfile> {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let profile = UserProfile {
            name: form.name,
            title: non_empty(form.title).unwrap_or_else(|| ONBOARDING_TITLE.to_string()),
            bio: non_empty(form.bio).unwrap_or_default(),
            yearly_goal: form.yearly_goal.filter(|g| *g > 0).unwrap_or(ONBOARDING_YEARLY_GOAL),
            ..UserProfile::default()
        };
        let saved = self.save(profile).await?;
        info!("Onboarding complete for '{}'", saved.name);
        Ok(saved)
    }

    pub async fn edit(&mut self, edit: ProfileEdit) -> LibraryResult<&UserProfile> {
        let profile = UserProfile {
            name: edit.name,
            title: edit.title.trim().to_string(),
            bio: edit.bio.trim().to_string(),
            ..self.profile.clone()
        };
        self.save(profile).await
    }

    /// Replaces the avatar with an embedded image (`data:image/...`).
    pub async fn set_avatar_image(&mut self, data_uri: &str) -> LibraryResult<&UserProfile> {
        if !data_uri.starts_with("data:image") {
            return Err(LibraryError::Validation(
                "avatar must be an embedded image".into(),
            ));
        }
        let profile = UserProfile {
            avatar: data_uri.to_string(),
            ..self.profile.clone()
        };
        self.save(profile).await
    }

    /// Sets either goal or both, validating them together so a bad value
    /// leaves both unchanged.
    pub async fn set_goals(
        &mut self,
        yearly_goal: Option<u32>,
        daily_page_goal: Option<u32>,
    ) -> LibraryResult<&UserProfile> {
        let profile = UserProfile {
            yearly_goal: yearly_goal.unwrap_or(self.profile.yearly_goal),
            daily_page_goal: daily_page_goal.unwrap_or(self.profile.daily_page_goal),
            ..self.profile.clone()
        };
        self.save(profile).await
    }

    pub async fn set_yearly_goal(&mut self, goal: u32) -> LibraryResult<&UserProfile> {
        self.set_goals(Some(goal), None).await
    }

    pub async fn set_daily_page_goal(&mut self, goal: u32) -> LibraryResult<&UserProfile> {
        self.set_goals(None, Some(goal)).await
    }

    pub async fn set_preferences(
        &mut self,
        preferences: Preferences,
    ) -> LibraryResult<&UserProfile> {
        let profile = UserProfile {
            preferences,
            ..self.profile.clone()
        };
        self.save(profile).await
    }

    /// Part of the profile restart: the yearly goal goes back to its default.
    pub async fn reset_goals(&mut self) -> LibraryResult<&UserProfile> {
        self.set_yearly_goal(DEFAULT_YEARLY_GOAL).await
    }

    /// Deletes the stored profile; the store returns to first-run defaults.
    pub async fn clear(&mut self) -> LibraryResult<()> {
        self.persistence.remove(USER_KEY).await?;
        self.profile = UserProfile::default();
        self.first_run = true;
        Ok(())
    }
}
