//! IPC between this process and the extension host.
//!
//! Inbound traffic is decoded into [`ExtensionMessage`] and handed to the
//! dispatcher. Outbound traffic goes through an [`IpcSender`]; the
//! dispatcher never owns the transport itself.

mod types;

use tokio::sync::mpsc;

use super::error::{ExtensionError, ExtensionResult};

pub use types::{ExtensionMessage, HostMessage};

/// Outbound half of the host channel.
pub trait IpcSender {
    fn send(&mut self, message: HostMessage) -> ExtensionResult<()>;
}

impl IpcSender for mpsc::UnboundedSender<HostMessage> {
    fn send(&mut self, message: HostMessage) -> ExtensionResult<()> {
        mpsc::UnboundedSender::send(self, message)
            .map_err(|e| ExtensionError::Ipc(format!("host channel closed: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sender that records every message.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingSender(pub Rc<RefCell<Vec<HostMessage>>>);

    impl RecordingSender {
        pub(crate) fn take(&self) -> Vec<HostMessage> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl IpcSender for RecordingSender {
        fn send(&mut self, message: HostMessage) -> ExtensionResult<()> {
            self.0.borrow_mut().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_channel_sender() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        IpcSender::send(
            &mut tx,
            HostMessage::UnloadAck {
                extension_id: "abc".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            rx.recv().await,
            Some(HostMessage::UnloadAck {
                extension_id: "abc".to_string()
            })
        );

        drop(rx);
        let err = IpcSender::send(
            &mut tx,
            HostMessage::EventAck {
                extension_id: "abc".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ExtensionError::Ipc(_)));
    }
}
