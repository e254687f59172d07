//! Profile store implementations.
//!
//! [`JsonFileProfileStore`] lays profiles out as
//! `<root>/<stack>/tenants/<tenant_id>/permissions.json`.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use clawgate_core::{PermissionProfile, ProfileStore, SecurityError, SecurityResult, TenantId};

const COMPONENT: &str = "profile store";

/// File name of a stored profile.
pub const PROFILE_FILE_NAME: &str = "permissions.json";

/// Process-local profile store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<TenantId, PermissionProfile>>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, tenant_id: &TenantId) -> SecurityResult<Option<PermissionProfile>> {
        let profiles = self.profiles.read().unwrap_or_else(|e| {
            warn!("profile store lock poisoned, recovering");
            e.into_inner()
        });
        Ok(profiles.get(tenant_id).cloned())
    }

    fn put(&self, tenant_id: &TenantId, profile: &PermissionProfile) -> SecurityResult<()> {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| {
            warn!("profile store lock poisoned, recovering");
            e.into_inner()
        });
        profiles.insert(tenant_id.clone(), profile.clone());
        Ok(())
    }
}

/// Profile store backed by one JSON document per tenant.
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    root: PathBuf,
    stack: String,
}

impl JsonFileProfileStore {
    /// Store profiles under `root/stack`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, stack: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            stack: stack.into(),
        }
    }

    /// Path of the tenant's profile document.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if the tenant id cannot be used as a
    /// directory name.
    pub fn profile_path(&self, tenant_id: &TenantId) -> SecurityResult<PathBuf> {
        let id = tenant_id.as_str();
        let usable = !id.is_empty()
            && id != "."
            && id != ".."
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !usable {
            return Err(SecurityError::infrastructure(
                COMPONENT,
                format!("tenant id '{id}' is not a valid storage key"),
            ));
        }
        Ok(self
            .root
            .join(&self.stack)
            .join("tenants")
            .join(id)
            .join(PROFILE_FILE_NAME))
    }
}

fn io_error(path: &Path, e: &io::Error) -> SecurityError {
    SecurityError::infrastructure(COMPONENT, format!("{}: {e}", path.display()))
}

impl ProfileStore for JsonFileProfileStore {
    fn get(&self, tenant_id: &TenantId) -> SecurityResult<Option<PermissionProfile>> {
        let path = self.profile_path(tenant_id)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(tenant_id = %tenant_id, "no stored profile");
                return Ok(None);
            },
            Err(e) => return Err(io_error(&path, &e)),
        };
        serde_json::from_str(&contents).map(Some).map_err(|e| {
            SecurityError::infrastructure(COMPONENT, format!("{}: {e}", path.display()))
        })
    }

    fn put(&self, tenant_id: &TenantId, profile: &PermissionProfile) -> SecurityResult<()> {
        let path = self.profile_path(tenant_id)?;
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| SecurityError::infrastructure(COMPONENT, e.to_string()))?;

        // Unique temp file per write in the same directory, then atomic rename.
        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| io_error(parent, &e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| io_error(tmp.path(), &e))?;
        tmp.persist(&path).map_err(|e| io_error(&path, &e.error))?;

        info!(tenant_id = %tenant_id, path = %path.display(), "profile saved");
        Ok(())
    }
}
