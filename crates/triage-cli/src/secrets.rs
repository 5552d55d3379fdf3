use triage_core::config::{ConfigKey, SecretBackend};
use triage_core::{Result, TriageError};

/// Keychain service every secret is filed under.
pub const SERVICE: &str = "asana";

/// Secrets in the OS credential store, one entry per config key.
pub struct KeyringBackend;

impl KeyringBackend {
    fn entry(key: ConfigKey) -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE, key.as_str()).map_err(|e| TriageError::Secret(e.to_string()))
    }
}

/// A missing entry is an unset key; any other keychain failure is an error.
fn stored_value(key: ConfigKey, lookup: keyring::Result<String>) -> Result<Option<String>> {
    match lookup {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(TriageError::Secret(format!("reading {key}: {e}"))),
    }
}

impl SecretBackend for KeyringBackend {
    fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        stored_value(key, Self::entry(key)?.get_password())
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .map_err(|e| TriageError::Secret(e.to_string()))
    }
}
