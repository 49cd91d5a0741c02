//! API permissions and the per-call permission gate.
//!
//! This module provides:
//! - `PermissionSet` - API names and host patterns granted to an extension
//! - `ApiRegistry` - which functions are privileged and which permission
//!   each one needs
//! - `PermissionGate` - the allow/deny decision for a single API call

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::classifier::Classification;
use super::error::AccessDenied;
use super::manifest::Extension;
use crate::config::ExtensionsConfig;

/// The set of permissions an extension declares or currently holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    /// API permission names (e.g. `"tabs"`, `"storage"`).
    #[serde(default)]
    pub apis: BTreeSet<String>,

    /// Host match patterns (e.g. `"https://*.example.com/*"`).
    #[serde(default)]
    pub explicit_hosts: BTreeSet<String>,
}

impl PermissionSet {
    pub fn from_apis<'a>(apis: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            apis: apis.into_iter().map(str::to_string).collect(),
            explicit_hosts: BTreeSet::new(),
        }
    }

    pub fn has_api(&self, name: &str) -> bool {
        self.apis.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty() && self.explicit_hosts.is_empty()
    }

    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        PermissionSet {
            apis: self.apis.union(&other.apis).cloned().collect(),
            explicit_hosts: self
                .explicit_hosts
                .union(&other.explicit_hosts)
                .cloned()
                .collect(),
        }
    }

    pub fn difference(&self, other: &PermissionSet) -> PermissionSet {
        PermissionSet {
            apis: self.apis.difference(&other.apis).cloned().collect(),
            explicit_hosts: self
                .explicit_hosts
                .difference(&other.explicit_hosts)
                .cloned()
                .collect(),
        }
    }
}

/// Direction of a runtime permission change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionUpdate {
    Added,
    Removed,
}

/// Namespace of a function name: everything before the first `.`.
pub fn namespace_of(function: &str) -> &str {
    function.split_once('.').map_or(function, |(ns, _)| ns)
}

/// Classification of API functions.
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    unprivileged: HashSet<String>,
    implicit: HashSet<String>,
}

impl ApiRegistry {
    pub fn from_config(config: &ExtensionsConfig) -> Self {
        Self {
            unprivileged: config.unprivileged_functions.iter().cloned().collect(),
            implicit: config.implicit_permissions.iter().cloned().collect(),
        }
    }

    /// Permission a function requires (`tabs.create` needs `tabs`).
    pub fn permission_for<'a>(&self, function: &'a str) -> &'a str {
        namespace_of(function)
    }

    /// Privileged functions may only run in blessed extension contexts.
    /// A function is unprivileged when it, or its whole namespace, is
    /// listed as such.
    pub fn is_privileged(&self, function: &str) -> bool {
        !(self.unprivileged.contains(function)
            || self.unprivileged.contains(namespace_of(function)))
    }

    /// Whether `permissions` cover `function`.
    pub fn is_permitted(&self, permissions: &PermissionSet, function: &str) -> bool {
        let permission = self.permission_for(function);
        self.implicit.contains(permission)
            || permissions.has_api(permission)
            || permissions.has_api(function)
    }
}

/// Decides whether a context may call an API function.
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    registry: ApiRegistry,
}

impl PermissionGate {
    pub fn new(registry: ApiRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    /// Check a call. The first failing rule wins and nothing is mutated.
    ///
    /// `extension` is the loaded extension the calling context belongs to,
    /// if any.
    pub fn check(
        &self,
        extension: Option<&Extension>,
        classification: Classification,
        frame_sandboxed: bool,
        function: &str,
    ) -> Result<(), AccessDenied> {
        let Some(extension) = extension else {
            return Err(AccessDenied::NotInExtension);
        };

        if !self
            .registry
            .is_permitted(extension.active_permissions(), function)
        {
            return Err(AccessDenied::MissingPermission {
                function: function.to_string(),
            });
        }

        if self.registry.is_privileged(function)
            && classification != Classification::BlessedExtension
        {
            return Err(AccessDenied::PrivilegedOnly {
                function: function.to_string(),
            });
        }

        if frame_sandboxed {
            return Err(AccessDenied::SandboxedFrame {
                function: function.to_string(),
            });
        }

        Ok(())
    }
}
