//! Keychain-backed session persistence, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;
use paydash_core::{Error, Result, Session, SessionPersistence, SessionStore};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "paydash-cli";

#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    username: String,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("dashboard_session:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for KeyringSessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> Result<Option<Session>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> Result<Option<Session>> {
        let store = Self::test_store();
        let guard = store
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard
            .get(&self.username)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(Error::from)
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = zeroize::Zeroizing::new(serde_json::to_string(session)?);
        self.entry()?
            .set_password(&raw)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        let store = Self::test_store();
        let mut guard = store
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> Result<()> {
        let entry = self.entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> Result<()> {
        let store = Self::test_store();
        let mut guard = store
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

/// Session store for `profile_name`, seeded from the keychain.
pub fn open_session_store(profile_name: &str) -> Result<SessionStore> {
    SessionStore::restore(KeyringSessionStore::new(profile_name))
}

#[cfg(test)]
mod tests {
    use paydash_core::UserProfile;
    use pretty_assertions::assert_eq;

    use super::*;

    fn session(token: &str) -> Session {
        Session::new(
            token,
            UserProfile {
                id: "user_1".to_string(),
                email: Some("ops@acme.io".to_string()),
                company_name: None,
            },
        )
    }

    #[test]
    fn sessions_are_scoped_per_profile() {
        let work = KeyringSessionStore::new("auth-test-work");
        let home = KeyringSessionStore::new("auth-test-home");
        work.save_session(&session("work-token")).unwrap();

        assert_eq!(
            work.load_session().unwrap().map(|s| s.token),
            Some("work-token".to_string())
        );
        assert!(home.load_session().unwrap().is_none());

        work.clear_session().unwrap();
        assert!(work.load_session().unwrap().is_none());
        work.clear_session().unwrap();
    }

    #[test]
    fn open_session_store_restores_saved_session() {
        KeyringSessionStore::new("auth-test-restore")
            .save_session(&session("restored"))
            .unwrap();

        let store = open_session_store("auth-test-restore").unwrap();
        assert!(store.is_authenticated());
        assert_eq!(
            store.profile().and_then(|profile| profile.email),
            Some("ops@acme.io".to_string())
        );
    }
}
