use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::profile::ProfilesData;
use crate::prompt::Prompt;
use crate::storage::{KeyValueStore, LEGACY_PROMPTS_KEY, PROFILES_KEY};

/// Read the vault from `backend`, migrating a legacy flat prompt list on
/// first use.
///
/// Once `PROFILES_KEY` exists the legacy key is never looked at again, so
/// calling this repeatedly is a pure read after the first migration. Any
/// read, parse, or migration write error comes back as a `LoadFailure`.
pub fn load<S: KeyValueStore>(backend: &S) -> Result<ProfilesData> {
    let stored = backend.get(PROFILES_KEY).map_err(|e| Error::load_failure(e.to_string()))?;
    if let Some(json) = stored {
        debug!(bytes = json.len(), "loading profiles");
        return serde_json::from_str(&json).map_err(|e| Error::load_failure(e.to_string()));
    }

    let legacy = backend.get(LEGACY_PROMPTS_KEY).map_err(|e| Error::load_failure(e.to_string()))?;
    let prompts: Vec<Prompt> = match legacy {
        Some(json) => serde_json::from_str(&json).map_err(|e| Error::load_failure(e.to_string()))?,
        None => return Ok(ProfilesData::default()),
    };
    if prompts.is_empty() {
        return Ok(ProfilesData::default());
    }

    info!(prompts = prompts.len(), "migrating legacy prompt list");
    let migrated = ProfilesData::from_legacy(prompts);
    let json = serde_json::to_string(&migrated).map_err(|e| Error::load_failure(e.to_string()))?;
    backend.set(PROFILES_KEY, &json).map_err(|e| Error::load_failure(e.to_string()))?;
    backend.remove(LEGACY_PROMPTS_KEY).map_err(|e| Error::load_failure(e.to_string()))?;
    Ok(migrated)
}

/// serialize `data` under `PROFILES_KEY`, reporting failures as `SaveFailure`
pub fn save<S: KeyValueStore>(backend: &S, data: &ProfilesData) -> Result<()> {
    let json = serde_json::to_string(data).map_err(|e| Error::save_failure(e.to_string()))?;
    backend.set(PROFILES_KEY, &json).map_err(|e| Error::save_failure(e.to_string()))?;
    debug!(bytes = json.len(), "saved profiles");
    Ok(())
}

/// Owns the current `ProfilesData` snapshot and writes it back whenever an
/// update produces a different snapshot.
pub struct ProfileStore<S: KeyValueStore> {
    backend: S,
    data: ProfilesData,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Load the vault. A failed load is handed back next to an empty store
    /// so the session can go on; nothing is written until the first change.
    pub fn open(backend: S) -> (ProfileStore<S>, Option<Error>) {
        match load(&backend) {
            Ok(data) => (ProfileStore { backend: backend, data: data }, None),
            Err(e) => {
                warn!(error = %e, "falling back to an empty vault");
                (ProfileStore { backend: backend, data: ProfilesData::default() }, Some(e))
            }
        }
    }

    pub fn data(&self) -> &ProfilesData {
        &self.data
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Replace the snapshot with `f(current)` and save it if it changed.
    ///
    /// The new snapshot is kept even when saving fails; the `SaveFailure`
    /// only means the durable copy is stale. Returns whether anything changed.
    pub fn update<F>(&mut self, f: F) -> Result<bool>
        where F: FnOnce(&ProfilesData) -> ProfilesData
    {
        let next = f(&self.data);
        if next == self.data {
            return Ok(false);
        }
        self.data = next;
        if let Err(e) = save(&self.backend, &self.data) {
            warn!(error = %e, "profile data kept in memory only");
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::storage::MemoryStore;

    struct ReadOnly(MemoryStore);

    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::from("disk full"))
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    const LEGACY: &str = r#"[{"id":2,"fullPrompt":"second","category":"B"},
                             {"id":1,"task":"first","category":"A"}]"#;

    #[test]
    fn empty_backend_loads_empty_state() {
        let backend = MemoryStore::new();
        let data = load(&backend).unwrap();
        assert_eq!(data, ProfilesData::default());
        assert!(!backend.contains(PROFILES_KEY));
    }

    #[test]
    fn legacy_list_is_migrated_once() {
        let backend = MemoryStore::new();
        backend.set(LEGACY_PROMPTS_KEY, LEGACY).unwrap();

        let first = load(&backend).unwrap();
        assert_eq!(first.current_user.as_deref(), Some("Default Profile"));
        let texts: Vec<&str> = first.current_prompts().iter().map(|p| p.full_prompt.as_str()).collect();
        assert_eq!(texts, vec!["second", "Task: first"]);
        assert!(!backend.contains(LEGACY_PROMPTS_KEY));
        assert!(backend.contains(PROFILES_KEY));

        // a legacy key that reappears later is ignored
        backend.set(LEGACY_PROMPTS_KEY, "[{\"id\":9,\"fullPrompt\":\"late\"}]").unwrap();
        let second = load(&backend).unwrap();
        assert_eq!(second, first);
        assert!(backend.contains(LEGACY_PROMPTS_KEY));
    }

    #[test]
    fn empty_legacy_list_is_left_alone() {
        let backend = MemoryStore::new();
        backend.set(LEGACY_PROMPTS_KEY, "[]").unwrap();
        assert_eq!(load(&backend).unwrap(), ProfilesData::default());
        assert!(!backend.contains(PROFILES_KEY));
    }

    #[test]
    fn malformed_data_is_a_load_failure() {
        let backend = MemoryStore::new();
        backend.set(PROFILES_KEY, "{not json").unwrap();
        let (store, err) = ProfileStore::open(&backend);
        assert!(err.unwrap().is_load_failure());
        assert_eq!(store.data(), &ProfilesData::default());
        // the unreadable copy is not clobbered by the fallback
        assert_eq!(backend.get(PROFILES_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn updates_are_saved_only_when_changed() {
        let backend = MemoryStore::new();
        let (mut store, err) = ProfileStore::open(&backend);
        assert!(err.is_none());

        assert!(!store.update(|d| d.switch_profile()).unwrap());
        assert!(!backend.contains(PROFILES_KEY));

        assert!(store.update(|d| d.create_profile("Alice")).unwrap());
        let reloaded = load(&backend).unwrap();
        assert_eq!(&reloaded, store.data());
    }

    #[test]
    fn save_failure_keeps_memory_state() {
        let (mut store, err) = ProfileStore::open(ReadOnly(MemoryStore::new()));
        assert!(err.is_none());
        let e = store.update(|d| d.create_profile("Alice")).unwrap_err();
        assert!(matches!(e.kind, ErrorKind::SaveFailure));
        assert_eq!(store.data().current_user.as_deref(), Some("Alice"));
        assert!(!store.backend().0.contains(PROFILES_KEY));
    }

    #[test]
    fn failed_migration_write_is_a_load_failure() {
        let inner = MemoryStore::new();
        inner.set(LEGACY_PROMPTS_KEY, LEGACY).unwrap();
        let backend = ReadOnly(inner);
        assert!(load(&backend).unwrap_err().is_load_failure());
        assert!(backend.0.contains(LEGACY_PROMPTS_KEY));
    }
}
