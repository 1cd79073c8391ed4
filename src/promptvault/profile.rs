use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::errors::{Error, ErrorKind, Result};
use crate::prompt::Prompt;

/// name of the profile legacy prompts are migrated into
pub static DEFAULT_PROFILE: &'static str = "Default Profile";

/// A named, isolated collection of prompts, newest first
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub prompts: Vec<Prompt>,
}

/// Root object of the vault: every profile plus the one currently in use.
///
/// Mutators never change `self`; they return the next snapshot, which the
/// store compares against the previous one to decide whether to save.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesData {
    pub current_user: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfilesData {
    /// the state a legacy flat prompt list migrates into
    pub fn from_legacy(prompts: Vec<Prompt>) -> ProfilesData {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), Profile { prompts: prompts });
        ProfilesData {
            current_user: Some(DEFAULT_PROFILE.to_string()),
            profiles: profiles,
        }
    }

    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(|k| k.as_str()).collect()
    }

    pub fn current_profile(&self) -> Option<(&str, &Profile)> {
        let name = self.current_user.as_deref()?;
        self.profiles.get(name).map(|p| (name, p))
    }

    /// prompts of the current profile, empty when logged out
    pub fn current_prompts(&self) -> &[Prompt] {
        match self.current_profile() {
            Some((_, p)) => &p.prompts,
            None => &[],
        }
    }

    pub fn find_prompt(&self, id: i64) -> Option<&Prompt> {
        self.current_prompts().iter().find(|p| p.id == id)
    }

    /// `name` must come from `profile_names`
    pub fn select_profile(&self, name: &str) -> ProfilesData {
        ProfilesData {
            current_user: Some(name.to_string()),
            profiles: self.profiles.clone(),
        }
    }

    /// `name` must already have passed `validate_profile_name`
    pub fn create_profile(&self, name: &str) -> ProfilesData {
        let mut profiles = self.profiles.clone();
        profiles.insert(name.to_string(), Profile::default());
        ProfilesData {
            current_user: Some(name.to_string()),
            profiles: profiles,
        }
    }

    /// put `prompt` at the front of the current profile
    pub fn add_prompt(&self, profile_name: &str, prompt: Prompt) -> ProfilesData {
        if self.current_user.as_deref() != Some(profile_name) {
            return self.clone();
        }
        let mut profiles = self.profiles.clone();
        let mut prompts = Vec::with_capacity(1 + self.profiles.get(profile_name).map_or(0, |p| p.prompts.len()));
        prompts.push(prompt);
        if let Some(existing) = self.profiles.get(profile_name) {
            prompts.extend(existing.prompts.iter().cloned());
        }
        profiles.insert(profile_name.to_string(), Profile { prompts: prompts });
        ProfilesData {
            current_user: self.current_user.clone(),
            profiles: profiles,
        }
    }

    pub fn delete_prompt(&self, profile_name: &str, id: i64) -> ProfilesData {
        let existing = match self.profiles.get(profile_name) {
            Some(p) if p.prompts.iter().any(|n| n.id == id) => p,
            _ => return self.clone(),
        };
        let mut profiles = self.profiles.clone();
        profiles.insert(profile_name.to_string(),
                        Profile {
                            prompts: existing.prompts.iter().filter(|n| n.id != id).cloned().collect(),
                        });
        ProfilesData {
            current_user: self.current_user.clone(),
            profiles: profiles,
        }
    }

    /// log out without touching any profile
    pub fn switch_profile(&self) -> ProfilesData {
        ProfilesData {
            current_user: None,
            profiles: self.profiles.clone(),
        }
    }

    /// Wall-clock milliseconds, bumped past the largest id already in
    /// `profile_name` so two prompts saved in the same tick stay distinct.
    pub fn next_prompt_id(&self, profile_name: &str, now_millis: i64) -> Result<i64> {
        let max_id = self.profiles
                         .get(profile_name)
                         .and_then(|p| p.prompts.iter().map(|n| n.id).max());
        match max_id {
            Some(m) if m >= now_millis => {
                m.checked_add(1)
                 .ok_or_else(|| Error::new(ErrorKind::Generic, "no prompt id left after the largest stored id"))
            }
            _ => Ok(now_millis),
        }
    }
}

/// Check a candidate profile name against the existing ones and return the
/// canonical (trimmed) name to create.
pub fn validate_profile_name<'a, I>(candidate: &str, existing: I) -> Result<String>
    where I: IntoIterator<Item = &'a str>
{
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::EmptyName, "Profile name cannot be empty."));
    }
    let lowered = trimmed.to_lowercase();
    if existing.into_iter().any(|e| e.to_lowercase() == lowered) {
        return Err(Error::new(ErrorKind::DuplicateName, "A profile with this name already exists."));
    }
    Ok(trimmed.to_string())
}
