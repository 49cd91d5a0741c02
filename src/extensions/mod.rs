//! Extension context tracking and API request routing.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//! ├── extensions: ExtensionSet (manifests + active permissions)
//! ├── active_extensions: HashSet<ExtensionId>
//! ├── isolated_worlds: HashMap<world_id, ExtensionId>
//! ├── contexts: ScriptContextRegistry (generation-counted arena)
//! ├── correlator: RequestCorrelator (request_id -> callback)
//! ├── gate: PermissionGate (ApiRegistry)
//! └── sender: Box<dyn IpcSender>
//! ```
//!
//! Every script context is classified once, when it is created. API calls
//! pass the permission gate, get a request id, and go to the host; the
//! response is routed back to the caller's callback exactly once. Tearing
//! down a context orphans its outstanding requests so no response can
//! reach dead script state.

pub mod classifier;
pub mod context;
pub mod correlator;
pub mod dispatcher;
mod error;
pub mod ipc;
mod manifest;
pub mod permissions;
pub mod registry;

pub use classifier::{classify, Classification, ClassificationInput};
pub use context::{Frame, ScriptContextEntry, ScriptEnvironment, ViewType};
pub use correlator::{RequestCorrelator, RequestId, Response, ResponseCallback};
pub use dispatcher::{ContextGroup, Dispatcher};
pub use error::{AccessDenied, ExtensionError, ExtensionResult};
pub use ipc::{ExtensionMessage, HostMessage, IpcSender};
pub use manifest::{Extension, ExtensionManifest, ExtensionSet, EXTENSION_SCHEME};
pub use permissions::{ApiRegistry, PermissionGate, PermissionSet, PermissionUpdate};
pub use registry::{ContextId, ScriptContextRegistry};

/// Extension identifier. Empty means "no extension".
pub type ExtensionId = String;
