//! Profile persistence: in-memory cache over one JSON file per printer.
//!
//! Reads vastly outnumber writes, so the cache sits behind a
//! readers-writer lock with a load-miss upgrade: check under the read
//! lock, release, load from disk, then reacquire for write and check
//! again before populating.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use thiserror::Error;

use super::types::Profile;

/// Profile age beyond which a device is re-discovered.
const MAX_PROFILE_AGE_DAYS: i64 = 7;
/// Validation success rate below which a profile is distrusted.
const MIN_SUCCESS_RATE: f64 = 0.8;
/// Consecutive error count beyond which a profile is distrusted.
const MAX_ERROR_COUNT: u32 = 5;

/// Errors from profile persistence.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("invalid profile: {0}")]
    Invalid(String),
}

/// Thread-safe profile cache backed by a directory of JSON files.
#[derive(Debug)]
pub struct ProfileStore {
    profile_dir: PathBuf,
    cache: RwLock<HashMap<String, Profile>>,
}

impl ProfileStore {
    /// Open (and create if needed) the profile directory.
    pub fn new(profile_dir: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let profile_dir = profile_dir.into();
        fs::create_dir_all(&profile_dir)?;
        Ok(Self {
            profile_dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Fetch a profile from cache or disk. `None` signals that discovery
    /// is needed. A corrupted on-disk record reads as absent.
    pub fn get_or_discover(&self, printer_id: &str) -> Option<Profile> {
        {
            let cache = self.cache.read().expect("profile cache poisoned");
            if let Some(profile) = cache.get(printer_id) {
                return Some(profile.clone());
            }
        }

        let profile = self.load_from_disk(printer_id)?;

        let mut cache = self.cache.write().expect("profile cache poisoned");
        let entry = cache
            .entry(printer_id.to_string())
            .or_insert_with(|| profile);
        Some(entry.clone())
    }

    /// Persist a profile to cache and disk, overwriting atomically.
    pub fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        if profile.printer_id.is_empty() {
            return Err(ProfileError::Invalid(
                "profile has an empty printer id".to_string(),
            ));
        }

        let mut cache = self.cache.write().expect("profile cache poisoned");
        cache.insert(profile.printer_id.clone(), profile.clone());
        self.write_to_disk(profile)
    }

    /// Record the outcome of one poll against the profile. Success clears
    /// the error state; failures degrade the success rate.
    pub fn update_validation(
        &self,
        printer_id: &str,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), ProfileError> {
        let mut cache = self.cache.write().expect("profile cache poisoned");
        let profile = cache
            .get_mut(printer_id)
            .ok_or_else(|| ProfileError::NotFound(printer_id.to_string()))?;

        profile.last_validated_at = Utc::now();
        profile.discovery_attempts += 1;

        if success {
            profile.error_count = 0;
            profile.last_error = None;
        } else {
            profile.error_count += 1;
            profile.last_error = error.map(str::to_string);
        }

        let attempts = profile.discovery_attempts;
        let errors = profile.error_count.min(attempts);
        profile.success_rate = f64::from(attempts - errors) / f64::from(attempts);

        let snapshot = profile.clone();
        drop(cache);
        self.write_to_disk(&snapshot)
    }

    /// True when any freshness invariant is violated: the profile is
    /// missing, older than seven days, unreliable, or error-ridden.
    pub fn needs_rediscovery(&self, printer_id: &str) -> bool {
        let Some(profile) = self.get_or_discover(printer_id) else {
            return true;
        };

        let age = Utc::now() - profile.discovered_at;
        age.num_days() > MAX_PROFILE_AGE_DAYS
            || profile.success_rate < MIN_SUCCESS_RATE
            || profile.error_count > MAX_ERROR_COUNT
    }

    fn load_from_disk(&self, printer_id: &str) -> Option<Profile> {
        let path = self.profile_path(printer_id);
        let data = fs::read(&path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(printer_id, error = %e, "corrupted profile treated as absent");
                None
            }
        }
    }

    fn write_to_disk(&self, profile: &Profile) -> Result<(), ProfileError> {
        let path = self.profile_path(&profile.printer_id);
        let data = serde_json::to_vec_pretty(profile)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn profile_path(&self, printer_id: &str) -> PathBuf {
        self.profile_dir.join(format!("{}.json", safe_file_name(printer_id)))
    }

    pub fn dir(&self) -> &Path {
        &self.profile_dir
    }
}

/// Substitute the characters that are unsafe in file names.
fn safe_file_name(printer_id: &str) -> String {
    printer_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    use crate::profile::types::Capabilities;
    use crate::scanner::Brand;

    use super::*;

    fn sample_profile(id: &str) -> Profile {
        Profile {
            printer_id: id.to_string(),
            ip: "10.0.0.5".to_string(),
            brand: Brand::Hp,
            model: "LaserJet Pro M402".to_string(),
            oids: HashMap::from([(
                "counters".to_string(),
                vec!["1.3.6.1.2.1.43.10.2.1.4.1.1".to_string()],
            )]),
            counter_mappings: HashMap::from([(
                "1.3.6.1.2.1.43.10.2.1.4.1.1".to_string(),
                "total_pages".to_string(),
            )]),
            oid_metadata: HashMap::new(),
            oid_friendly_names: HashMap::new(),
            capabilities: Capabilities {
                counters: true,
                ..Capabilities::default()
            },
            discovered_at: Utc::now(),
            last_validated_at: Utc::now(),
            firmware_version: String::new(),
            snmp_version: "2c".to_string(),
            discovery_attempts: 1,
            last_error: None,
            error_count: 0,
            success_rate: 1.0,
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        let profile = sample_profile("10.0.0.5");
        store.save(&profile).unwrap();

        // Cold store (fresh cache) must read the same record back.
        let cold = ProfileStore::new(dir.path()).unwrap();
        let loaded = cold.get_or_discover("10.0.0.5").unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_miss_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();
        assert!(store.get_or_discover("nope").is_none());
    }

    #[test]
    fn test_corrupted_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), b"{not json").unwrap();
        assert!(store.get_or_discover("bad").is_none());
        assert!(store.needs_rediscovery("bad"));
    }

    #[test]
    fn test_unsafe_characters_in_file_name() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        let mut profile = sample_profile("SEC:30/CD\\A7*C7?22");
        profile.printer_id = "SEC:30/CD\\A7*C7?22".to_string();
        store.save(&profile).unwrap();

        assert!(dir.path().join("SEC_30_CD_A7_C7_22.json").exists());
        assert!(store.get_or_discover("SEC:30/CD\\A7*C7?22").is_some());
    }

    #[test]
    fn test_update_validation_success_rate() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();
        store.save(&sample_profile("p1")).unwrap();

        store.update_validation("p1", false, Some("timeout")).unwrap();
        let after_failure = store.get_or_discover("p1").unwrap();
        assert_eq!(after_failure.error_count, 1);
        assert_eq!(after_failure.last_error.as_deref(), Some("timeout"));
        assert!(after_failure.success_rate < 1.0);

        store.update_validation("p1", true, None).unwrap();
        let after_success = store.get_or_discover("p1").unwrap();
        assert_eq!(after_success.error_count, 0);
        assert!(after_success.last_error.is_none());
        assert_eq!(after_success.success_rate, 1.0);
    }

    #[test]
    fn test_needs_rediscovery_on_age() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        let mut profile = sample_profile("old");
        profile.discovered_at = Utc::now() - Duration::days(8);
        store.save(&profile).unwrap();
        assert!(store.needs_rediscovery("old"));

        let fresh = sample_profile("fresh");
        store.save(&fresh).unwrap();
        assert!(!store.needs_rediscovery("fresh"));
    }

    #[test]
    fn test_needs_rediscovery_on_reliability() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        let mut unreliable = sample_profile("flaky");
        unreliable.success_rate = 0.5;
        store.save(&unreliable).unwrap();
        assert!(store.needs_rediscovery("flaky"));

        let mut error_ridden = sample_profile("broken");
        error_ridden.error_count = 6;
        store.save(&error_ridden).unwrap();
        assert!(store.needs_rediscovery("broken"));
    }
}
