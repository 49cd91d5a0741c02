//! IPC message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extensions::correlator::RequestId;
use crate::extensions::error::ExtensionResult;
use crate::extensions::manifest::ExtensionManifest;
use crate::extensions::permissions::{PermissionSet, PermissionUpdate};
use crate::extensions::ExtensionId;

/// Messages from the host to this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtensionMessage {
    Loaded {
        extensions: Vec<ExtensionManifest>,
    },
    Unloaded {
        extension_id: ExtensionId,
    },
    ActivateExtension {
        extension_id: ExtensionId,
    },
    UpdatePermissions {
        extension_id: ExtensionId,
        reason: PermissionUpdate,
        permissions: PermissionSet,
    },
    /// Call a hidden method in the extension's contexts. An empty id
    /// targets every context.
    MessageInvoke {
        extension_id: ExtensionId,
        method: String,
        #[serde(default)]
        args: Value,
    },
    DeliverMessage {
        target_port_id: i32,
        message: Value,
    },
    DispatchOnConnect {
        target_port_id: i32,
        channel_name: String,
        #[serde(default)]
        tab: Value,
        source_extension_id: ExtensionId,
        target_extension_id: ExtensionId,
    },
    DispatchOnDisconnect {
        port_id: i32,
        #[serde(default)]
        error_message: Option<String>,
    },
    Response {
        request_id: RequestId,
        success: bool,
        #[serde(default)]
        payload: Value,
        #[serde(default)]
        error: String,
    },
    ShouldUnload {
        extension_id: ExtensionId,
        sequence_id: i32,
    },
    Unload {
        extension_id: ExtensionId,
    },
    CancelUnload {
        extension_id: ExtensionId,
    },
}

impl ExtensionMessage {
    /// Name of the variant, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            ExtensionMessage::Loaded { .. } => "loaded",
            ExtensionMessage::Unloaded { .. } => "unloaded",
            ExtensionMessage::ActivateExtension { .. } => "activate_extension",
            ExtensionMessage::UpdatePermissions { .. } => "update_permissions",
            ExtensionMessage::MessageInvoke { .. } => "message_invoke",
            ExtensionMessage::DeliverMessage { .. } => "deliver_message",
            ExtensionMessage::DispatchOnConnect { .. } => "dispatch_on_connect",
            ExtensionMessage::DispatchOnDisconnect { .. } => "dispatch_on_disconnect",
            ExtensionMessage::Response { .. } => "response",
            ExtensionMessage::ShouldUnload { .. } => "should_unload",
            ExtensionMessage::Unload { .. } => "unload",
            ExtensionMessage::CancelUnload { .. } => "cancel_unload",
        }
    }

    pub fn from_json(json: &str) -> ExtensionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Messages from this process to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Request {
        request_id: RequestId,
        name: String,
        args: Value,
        has_callback: bool,
        extension_id: ExtensionId,
        source_url: String,
    },
    IncrementLazyKeepalive {
        extension_id: ExtensionId,
    },
    DecrementLazyKeepalive {
        extension_id: ExtensionId,
    },
    EventAck {
        extension_id: ExtensionId,
    },
    ShouldUnloadAck {
        extension_id: ExtensionId,
        sequence_id: i32,
    },
    UnloadAck {
        extension_id: ExtensionId,
    },
}

impl HostMessage {
    pub fn to_json(&self) -> ExtensionResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
