//! Extension metadata known to this process.
//!
//! The host sends a manifest for every extension that may run script here.
//! Each manifest defines:
//! - Identity (id, name, version)
//! - Declared API permissions and explicit host patterns
//! - Sandboxed pages (served without extension privileges)
//! - Web extent for hosted apps
//! - Whether the background page is lazy (event page)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{ExtensionError, ExtensionResult};
use super::permissions::{PermissionSet, PermissionUpdate};
use super::ExtensionId;

/// URL scheme of extension resources.
pub const EXTENSION_SCHEME: &str = "chrome-extension";

/// Extension id the host substitutes when CSP blocks an extension page.
pub const INVALID_EXTENSION_ID: &str = "invalid";

/// Manifest of a loaded extension as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub id: ExtensionId,

    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub permissions: PermissionSet,

    /// Resource paths served as sandboxed pages (e.g. `"sandbox.html"`).
    #[serde(default)]
    pub sandboxed_pages: Vec<String>,

    /// URL prefixes owned by a hosted app.
    #[serde(default)]
    pub web_extent: Vec<String>,

    /// Whether the background page is unloaded when idle.
    #[serde(default)]
    pub lazy_background: bool,
}

impl ExtensionManifest {
    /// Validate the manifest for required fields.
    pub fn validate(&self) -> ExtensionResult<()> {
        if self.id.is_empty() || !self.id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExtensionError::ManifestInvalid {
                id: self.id.clone(),
                message: "id must be non-empty and alphanumeric".to_string(),
            });
        }

        if self.id == INVALID_EXTENSION_ID {
            return Err(ExtensionError::ManifestInvalid {
                id: self.id.clone(),
                message: "id is reserved".to_string(),
            });
        }

        if self.name.is_empty() {
            return Err(ExtensionError::ManifestInvalid {
                id: self.id.clone(),
                message: "name is required".to_string(),
            });
        }

        Ok(())
    }

    fn is_sandboxed_path(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.sandboxed_pages
            .iter()
            .any(|page| page.trim_start_matches('/') == path)
    }

    fn extent_contains(&self, url: &str) -> bool {
        self.web_extent.iter().any(|prefix| url.starts_with(prefix))
    }
}

/// A loaded extension and its currently active permissions.
#[derive(Debug, Clone)]
pub struct Extension {
    pub manifest: ExtensionManifest,
    active_permissions: PermissionSet,
}

impl Extension {
    pub fn new(manifest: ExtensionManifest) -> Self {
        let active_permissions = manifest.permissions.clone();
        Self {
            manifest,
            active_permissions,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn active_permissions(&self) -> &PermissionSet {
        &self.active_permissions
    }

    pub fn has_lazy_background(&self) -> bool {
        self.manifest.lazy_background
    }
}

/// All extensions loaded into this process, keyed by id.
#[derive(Debug, Default)]
pub struct ExtensionSet {
    extensions: HashMap<ExtensionId, Extension>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an extension.
    pub fn insert(&mut self, manifest: ExtensionManifest) -> ExtensionResult<()> {
        manifest.validate()?;
        self.extensions
            .insert(manifest.id.clone(), Extension::new(manifest));
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Extension> {
        self.extensions.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Extension> {
        self.extensions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.extensions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Apply a permission delta to an extension's active permissions.
    pub fn update_permissions(
        &mut self,
        id: &str,
        update: PermissionUpdate,
        delta: &PermissionSet,
    ) -> ExtensionResult<()> {
        let extension = self
            .extensions
            .get_mut(id)
            .ok_or_else(|| ExtensionError::ExtensionNotFound(id.to_string()))?;
        extension.active_permissions = match update {
            PermissionUpdate::Added => extension.active_permissions.union(delta),
            PermissionUpdate::Removed => extension.active_permissions.difference(delta),
        };
        Ok(())
    }

    /// Id of the extension (or hosted app) that owns `url`.
    ///
    /// Extension URLs resolve by host even when the extension is not
    /// loaded; callers check membership with [`contains`](Self::contains).
    pub fn extension_id_for_url(&self, url: &str) -> Option<ExtensionId> {
        if let Ok(parsed) = Url::parse(url) {
            if parsed.scheme() == EXTENSION_SCHEME {
                return parsed.host_str().map(str::to_string);
            }
        }
        self.extensions
            .values()
            .find(|ext| ext.manifest.extent_contains(url))
            .map(|ext| ext.manifest.id.clone())
    }

    /// Whether `url` is one of its extension's sandboxed pages.
    pub fn is_sandboxed_page(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if parsed.scheme() != EXTENSION_SCHEME {
            return false;
        }
        parsed
            .host_str()
            .and_then(|id| self.extensions.get(id))
            .is_some_and(|ext| ext.manifest.is_sandboxed_path(parsed.path()))
    }

    /// Whether extension bindings may be injected for `url`: a
    /// non-sandboxed page of a loaded extension or hosted app.
    pub fn bindings_allowed(&self, url: &str) -> bool {
        if self.is_sandboxed_page(url) {
            return false;
        }
        self.extension_id_for_url(url)
            .is_some_and(|id| self.contains(&id))
    }
}
