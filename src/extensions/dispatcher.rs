//! Per-process extension dispatcher.
//!
//! Owns the extension metadata, the script context registry and the
//! request table. Inbound host messages enter through
//! [`Dispatcher::handle_message`]; script-initiated API calls enter through
//! [`Dispatcher::start_request`].

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::classifier::{classify, Classification, ClassificationInput};
use super::context::{Frame, ScriptContextEntry, ScriptEnvironment, ViewType};
use super::correlator::{RequestCorrelator, RequestId, Response, ResponseCallback};
use super::error::{ExtensionError, ExtensionResult};
use super::ipc::{ExtensionMessage, HostMessage, IpcSender};
use super::manifest::{ExtensionSet, INVALID_EXTENSION_ID};
use super::permissions::{ApiRegistry, PermissionGate};
use super::registry::{ContextId, ScriptContextRegistry};
use super::ExtensionId;
use crate::config::ExtensionsConfig;

/// Hidden method that fires a named event in a context.
pub const EVENT_DISPATCH_FUNCTION: &str = "Event.dispatchEvent";
pub const ON_SUSPEND_EVENT: &str = "runtime.onSuspend";
pub const ON_SUSPEND_CANCELED_EVENT: &str = "runtime.onSuspendCanceled";

/// Script group a context was created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextGroup {
    #[default]
    Main,
    ContentScripts,
}

pub struct Dispatcher {
    extensions: ExtensionSet,
    active_extensions: HashSet<ExtensionId>,
    isolated_worlds: HashMap<i32, ExtensionId>,
    contexts: ScriptContextRegistry,
    correlator: RequestCorrelator,
    gate: PermissionGate,
    sender: Box<dyn IpcSender>,
    /// Requests that hold a lazy background keepalive.
    keepalive_requests: HashMap<RequestId, ExtensionId>,
    sweep_detached_on_dispatch: bool,
}

impl Dispatcher {
    pub fn new(config: &ExtensionsConfig, sender: Box<dyn IpcSender>) -> Self {
        Self {
            extensions: ExtensionSet::new(),
            active_extensions: HashSet::new(),
            isolated_worlds: HashMap::new(),
            contexts: ScriptContextRegistry::new(),
            correlator: RequestCorrelator::new(),
            gate: PermissionGate::new(ApiRegistry::from_config(config)),
            sender,
            keepalive_requests: HashMap::new(),
            sweep_detached_on_dispatch: config.sweep_detached_on_dispatch,
        }
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn contexts(&self) -> &ScriptContextRegistry {
        &self.contexts
    }

    pub fn context(&self, id: ContextId) -> Option<&ScriptContextEntry> {
        self.contexts.get(id)
    }

    pub fn is_extension_active(&self, extension_id: &str) -> bool {
        self.active_extensions.contains(extension_id)
    }

    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    /// Record that `world_id` runs content scripts of `extension_id`.
    pub fn set_isolated_world_extension(&mut self, world_id: i32, extension_id: &str) {
        self.isolated_worlds
            .insert(world_id, extension_id.to_string());
    }

    /// Register a new script context and fire its load event.
    pub fn did_create_script_context(
        &mut self,
        frame: &Rc<Frame>,
        world_id: i32,
        group: ContextGroup,
        env: Box<dyn ScriptEnvironment>,
    ) -> ContextId {
        let extension_id = self.extension_id_for_context(frame, world_id);
        let sandboxed = self.extensions.is_sandboxed_page(&frame.url);

        let classification = classify(ClassificationInput {
            is_content_script_group: group == ContextGroup::ContentScripts,
            extension_known: !extension_id.is_empty(),
            is_sandboxed_page: sandboxed,
            extension_active_in_process: self.active_extensions.contains(&extension_id),
            bindings_allowed_for_url: self.extensions.bindings_allowed(&frame.url),
            url_is_valid: Url::parse(&frame.url).is_ok(),
        });

        let lazy_background_page = classification == Classification::BlessedExtension
            && frame.view_type == ViewType::BackgroundPage
            && self
                .extensions
                .get(&extension_id)
                .is_some_and(|ext| ext.has_lazy_background());

        let weak_frame = Rc::downgrade(frame);
        let id = self.contexts.insert_with(
            |context_id| ScriptContextEntry {
                context_id,
                extension_id: extension_id.clone(),
                classification,
                world_id,
                frame: weak_frame,
                sandboxed,
                lazy_background_page,
            },
            env,
        );

        if let (Some(entry), Some(env)) = (self.contexts.get(id).cloned(), self.contexts.env_mut(id)) {
            env.on_load(&entry);
        }

        info!(
            context = %id,
            extension_id = %extension_id,
            ?classification,
            url = %frame.url,
            "created script context"
        );
        id
    }

    fn extension_id_for_context(&self, frame: &Frame, world_id: i32) -> ExtensionId {
        let extension_id = if world_id != 0 {
            self.isolated_worlds.get(&world_id).cloned().unwrap_or_default()
        } else {
            self.extensions
                .extension_id_for_url(&frame.url)
                .unwrap_or_default()
        };

        if extension_id.is_empty() || self.extensions.contains(&extension_id) {
            return extension_id;
        }
        // The host uses this id for pages blocked by CSP.
        if extension_id != INVALID_EXTENSION_ID {
            warn!(extension_id = %extension_id, url = %frame.url, "context for unknown extension");
        }
        ExtensionId::new()
    }

    /// Tear down a context: fire its unload event, drop it, and orphan its
    /// pending requests. Returns `false` for an id that is not live.
    pub fn will_release_script_context(&mut self, id: ContextId) -> bool {
        let Some((entry, mut env)) = self.contexts.remove(id) else {
            debug!(context = %id, "release of unknown script context");
            return false;
        };
        env.on_unload(&entry);
        self.orphan_requests(id);
        info!(context = %id, extension_id = %entry.extension_id, "released script context");
        true
    }

    fn orphan_requests(&mut self, id: ContextId) {
        for orphan in self.correlator.invalidate(id) {
            self.release_keepalive(orphan.request_id);
        }
    }

    /// Drop a context whose frame is gone. No unload event fires.
    fn discard_detached(&mut self, id: ContextId) {
        if self.contexts.remove(id).is_some() {
            debug!(context = %id, "discarded detached context");
        }
        self.orphan_requests(id);
    }

    /// Whether `id` is live and its frame still exists.
    fn is_attached(&self, id: ContextId) -> bool {
        self.contexts.get(id).is_some_and(|entry| !entry.is_detached())
    }

    /// Remove contexts whose frame is gone. Returns how many were removed.
    pub fn sweep_detached(&mut self) -> usize {
        let swept = self.contexts.sweep_detached();
        for entry in &swept {
            debug!(context = %entry.context_id, "swept detached context");
            self.orphan_requests(entry.context_id);
        }
        swept.len()
    }

    /// Start an API call on behalf of a context.
    ///
    /// The call is checked against the permission gate before anything is
    /// recorded or sent.
    pub fn start_request(
        &mut self,
        context_id: ContextId,
        function: &str,
        args: Value,
        callback: Option<ResponseCallback>,
    ) -> ExtensionResult<RequestId> {
        if self.contexts.is_live(context_id) && !self.is_attached(context_id) {
            self.discard_detached(context_id);
        }
        let entry = self
            .contexts
            .get(context_id)
            .ok_or(ExtensionError::ContextNotFound(context_id))?;

        let extension = if entry.has_extension() {
            self.extensions.get(&entry.extension_id)
        } else {
            None
        };
        if let Err(denied) =
            self.gate
                .check(extension, entry.classification, entry.sandboxed, function)
        {
            debug!(context = %context_id, function, reason = %denied, "request denied");
            return Err(denied.into());
        }

        let extension_id = entry.extension_id.clone();
        let source_url = entry.url().unwrap_or_default();
        let lazy = entry.lazy_background_page;
        let has_callback = callback.is_some();

        let request_id = self.correlator.allocate(
            context_id,
            function,
            callback.unwrap_or_else(|| Box::new(|_: Response| {})),
        );

        if lazy {
            self.keepalive_requests
                .insert(request_id, extension_id.clone());
            self.send(HostMessage::IncrementLazyKeepalive {
                extension_id: extension_id.clone(),
            });
        }

        self.send(HostMessage::Request {
            request_id,
            name: function.to_string(),
            args,
            has_callback,
            extension_id,
            source_url,
        });
        Ok(request_id)
    }

    fn release_keepalive(&mut self, request_id: RequestId) {
        if let Some(extension_id) = self.keepalive_requests.remove(&request_id) {
            self.send(HostMessage::DecrementLazyKeepalive { extension_id });
        }
    }

    fn send(&mut self, message: HostMessage) {
        if let Err(e) = self.sender.send(message) {
            warn!("Failed to send host message: {}", e);
        }
    }

    /// Call a hidden method in every context of `extension_id` (every
    /// context when empty). Returns how many contexts were reached.
    fn invoke(&mut self, extension_id: &str, method: &str, args: &Value) -> usize {
        if self.sweep_detached_on_dispatch {
            self.sweep_detached();
        }
        self.contexts.for_each_matching(
            |entry| extension_id.is_empty() || entry.extension_id == extension_id,
            |_, env| env.dispatch(method, args),
        )
    }

    fn dispatch_event(&mut self, extension_id: &str, event: &str) -> usize {
        self.invoke(extension_id, EVENT_DISPATCH_FUNCTION, &json!([event, []]))
    }

    /// Handle one inbound host message.
    pub fn handle_message(&mut self, message: ExtensionMessage) {
        debug!(tag = message.tag(), "extension message");
        match message {
            ExtensionMessage::Loaded { extensions } => {
                for manifest in extensions {
                    let id = manifest.id.clone();
                    if let Err(e) = self.extensions.insert(manifest) {
                        warn!(extension_id = %id, "Failed to load extension: {}", e);
                    }
                }
                debug!(count = self.extensions.len(), "extensions loaded");
            }
            ExtensionMessage::Unloaded { extension_id } => {
                self.extensions.remove(&extension_id);
                self.active_extensions.remove(&extension_id);
                self.isolated_worlds.retain(|_, owner| *owner != extension_id);
            }
            ExtensionMessage::ActivateExtension { extension_id } => {
                if !self.extensions.contains(&extension_id) {
                    warn!(extension_id = %extension_id, "activation of unknown extension ignored");
                    return;
                }
                self.active_extensions.insert(extension_id);
            }
            ExtensionMessage::UpdatePermissions {
                extension_id,
                reason,
                permissions,
            } => {
                if let Err(e) =
                    self.extensions
                        .update_permissions(&extension_id, reason, &permissions)
                {
                    warn!("Failed to update permissions: {}", e);
                }
            }
            ExtensionMessage::MessageInvoke {
                extension_id,
                method,
                args,
            } => {
                self.invoke(&extension_id, &method, &args);
                let lazy = self
                    .extensions
                    .get(&extension_id)
                    .is_some_and(|ext| ext.has_lazy_background());
                if method == EVENT_DISPATCH_FUNCTION && lazy {
                    self.send(HostMessage::EventAck { extension_id });
                }
            }
            ExtensionMessage::DeliverMessage {
                target_port_id,
                message,
            } => {
                self.invoke("", "Port.dispatchOnMessage", &json!([message, target_port_id]));
            }
            ExtensionMessage::DispatchOnConnect {
                target_port_id,
                channel_name,
                tab,
                source_extension_id,
                target_extension_id,
            } => {
                self.invoke(
                    "",
                    "Port.dispatchOnConnect",
                    &json!([
                        target_port_id,
                        channel_name,
                        tab,
                        source_extension_id,
                        target_extension_id
                    ]),
                );
            }
            ExtensionMessage::DispatchOnDisconnect {
                port_id,
                error_message,
            } => {
                self.invoke("", "Port.dispatchOnDisconnect", &json!([port_id, error_message]));
            }
            ExtensionMessage::Response {
                request_id,
                success,
                payload,
                error,
            } => {
                if let Some(owner) = self.correlator.owner(request_id) {
                    if !self.is_attached(owner) {
                        debug!(request_id, context = %owner, "response for destroyed context dropped");
                        self.discard_detached(owner);
                        return;
                    }
                }
                let response = Response {
                    success,
                    payload,
                    error,
                };
                if let Some(finished) = self.correlator.resolve(request_id, response) {
                    self.release_keepalive(finished.request_id);
                }
            }
            ExtensionMessage::ShouldUnload {
                extension_id,
                sequence_id,
            } => {
                self.send(HostMessage::ShouldUnloadAck {
                    extension_id,
                    sequence_id,
                });
            }
            ExtensionMessage::Unload { extension_id } => {
                self.dispatch_event(&extension_id, ON_SUSPEND_EVENT);
                self.send(HostMessage::UnloadAck { extension_id });
            }
            ExtensionMessage::CancelUnload { extension_id } => {
                self.dispatch_event(&extension_id, ON_SUSPEND_CANCELED_EVENT);
            }
        }
    }
}

/// Feed host messages to `dispatcher` until the channel closes.
pub async fn run(dispatcher: &mut Dispatcher, mut rx: mpsc::Receiver<ExtensionMessage>) {
    while let Some(message) = rx.recv().await {
        dispatcher.handle_message(message);
    }
    debug!("extension message channel closed");
}
