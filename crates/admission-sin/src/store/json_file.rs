use super::records::{Records, SinWrite};
use crate::{
    NewRegistration, Page, PaymentUpdate, Registration, RegistrationStore, Result, ThreadRandom,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    fs,
    io::Write,
    path::{Path, PathBuf},
};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// On-disk layout: the registrations plus the codes of deleted registrations.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    registrations: Vec<Registration>,
    #[serde(default)]
    retired_sins: BTreeSet<String>,
}

/// Files written before deletions were tracked hold a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Array(Vec<Registration>),
    File(StoreFile),
}

impl From<OnDisk> for StoreFile {
    fn from(value: OnDisk) -> Self {
        match value {
            OnDisk::Array(registrations) => Self {
                registrations,
                retired_sins: BTreeSet::new(),
            },
            OnDisk::File(file) => file,
        }
    }
}

/// A store backed by a single JSON file.
///
/// The file is an object with `registrations` and `retiredSins`; a bare array
/// of registrations is also accepted on open. The whole table is loaded on
/// [`JsonFileStore::open`] and rewritten after every mutation. Writes go to a
/// sibling temporary file which is then renamed over the live file, so a crash
/// mid-write leaves the previous contents intact. The in-memory table only
/// changes once the write has succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<Records>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing registrations.
    ///
    /// A missing or empty file is an empty store; the file and its parent
    /// directories are created on the first write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the file exists but cannot be read or
    /// does not hold registrations in either accepted layout.
    ///
    /// [`Error::Storage`]: crate::Error::Storage
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => StoreFile::default(),
            Ok(text) => serde_json::from_str::<OnDisk>(&text)?.into(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(err) => return Err(err.into()),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            count = file.registrations.len(),
            retired = file.retired_sins.len(),
            "loaded registrations"
        );

        Ok(Self {
            path,
            records: RwLock::new(Records::from_parts(file.registrations, file.retired_sins)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `op` to a copy of the table and, when it reports a change,
    /// persists the copy before making it current.
    fn mutate<T>(&self, op: impl FnOnce(&mut Records) -> Result<(T, bool)>) -> Result<T> {
        let mut guard = self.records.write();
        let mut next = guard.clone();
        let (out, changed) = op(&mut next)?;
        if changed {
            self.persist(&next)?;
            *guard = next;
        }
        Ok(out)
    }

    fn persist(&self, records: &Records) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(&StoreFile {
            registrations: records.sorted(),
            retired_sins: records.retired().clone(),
        })?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&body)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl RegistrationStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn insert(&self, new: NewRegistration) -> Result<Registration> {
        self.mutate(|records| Ok((records.insert(new, &ThreadRandom)?, true)))
    }

    fn get(&self, id: &str) -> Result<Option<Registration>> {
        Ok(self.records.read().get(id))
    }

    fn list(&self, page: Page) -> Result<Vec<Registration>> {
        Ok(self.records.read().page(page))
    }

    fn all(&self) -> Result<Vec<Registration>> {
        Ok(self.records.read().sorted())
    }

    fn update_payment(&self, id: &str, update: &PaymentUpdate) -> Result<Option<Registration>> {
        self.mutate(|records| {
            let updated = records.update_payment(id, update);
            let changed = updated.is_some();
            Ok((updated, changed))
        })
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.mutate(|records| {
            let removed = records.delete(id);
            Ok((removed, removed))
        })
    }

    fn list_all_sin_codes(&self) -> Result<HashSet<String>> {
        Ok(self.records.read().sin_codes())
    }

    fn apply_sin(&self, id: &str, sin: &str, generated_at: DateTime<Utc>) -> Result<bool> {
        self.mutate(|records| {
            let outcome = records.apply_sin(id, sin, generated_at)?;
            Ok((outcome.found(), outcome == SinWrite::Written))
        })
    }
}
