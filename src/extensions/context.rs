//! Script context records and the environment seam.

use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::classifier::Classification;
use super::registry::ContextId;
use super::ExtensionId;

/// Kind of view hosting a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Tab,
    BackgroundPage,
    Popup,
    Other,
}

/// A document frame. Owned by the embedder; contexts only hold a
/// [`Weak`] reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub url: String,
    pub view_type: ViewType,
}

impl Frame {
    pub fn new(url: impl Into<String>, view_type: ViewType) -> Rc<Self> {
        Rc::new(Self {
            url: url.into(),
            view_type,
        })
    }
}

/// Data recorded for a live script context. Immutable after creation.
#[derive(Debug, Clone)]
pub struct ScriptContextEntry {
    pub context_id: ContextId,
    /// Empty for contexts that belong to no extension.
    pub extension_id: ExtensionId,
    pub classification: Classification,
    pub world_id: i32,
    pub frame: Weak<Frame>,
    /// Sandboxed-page status of the frame URL at creation.
    pub sandboxed: bool,
    /// A blessed background page of an extension with a lazy background.
    pub lazy_background_page: bool,
}

impl ScriptContextEntry {
    pub fn has_extension(&self) -> bool {
        !self.extension_id.is_empty()
    }

    /// Whether the originating frame has been destroyed.
    pub fn is_detached(&self) -> bool {
        self.frame.strong_count() == 0
    }

    /// URL of the frame, if it is still alive.
    pub fn url(&self) -> Option<String> {
        self.frame.upgrade().map(|frame| frame.url.clone())
    }
}

/// The script engine behind a context.
///
/// Hidden-method calls and lifecycle events are pushed through this trait
/// so the engine can be swapped (or recorded in tests).
pub trait ScriptEnvironment {
    /// Invoke a hidden method such as `Event.dispatchEvent`.
    fn dispatch(&mut self, method: &str, args: &Value);

    fn on_load(&mut self, _entry: &ScriptContextEntry) {}

    fn on_unload(&mut self, _entry: &ScriptContextEntry) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Everything a context saw, shared with the test body.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct EnvLog(pub Rc<RefCell<Vec<String>>>);

    impl EnvLog {
        pub(crate) fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    pub(crate) struct RecordingEnv {
        pub(crate) log: EnvLog,
    }

    impl RecordingEnv {
        pub(crate) fn boxed(log: &EnvLog) -> Box<dyn ScriptEnvironment> {
            Box::new(Self { log: log.clone() })
        }
    }

    impl ScriptEnvironment for RecordingEnv {
        fn dispatch(&mut self, method: &str, args: &Value) {
            self.log.0.borrow_mut().push(format!("{} {}", method, args));
        }

        fn on_load(&mut self, entry: &ScriptContextEntry) {
            self.log
                .0
                .borrow_mut()
                .push(format!("load {:?}", entry.classification));
        }

        fn on_unload(&mut self, _entry: &ScriptContextEntry) {
            self.log.0.borrow_mut().push("unload".to_string());
        }
    }

    #[test]
    fn test_entry_detaches_with_frame() {
        let frame = Frame::new("chrome-extension://abc/popup.html", ViewType::Popup);
        let entry = ScriptContextEntry {
            context_id: ContextId::new(0, 0),
            extension_id: "abc".to_string(),
            classification: Classification::BlessedExtension,
            world_id: 0,
            frame: Rc::downgrade(&frame),
            sandboxed: false,
            lazy_background_page: false,
        };
        assert!(entry.has_extension());
        assert_eq!(entry.url().as_deref(), Some("chrome-extension://abc/popup.html"));
        drop(frame);
        assert!(entry.is_detached());
        assert_eq!(entry.url(), None);
    }
}
