//! Inbox channel types.
//!
//! Every background task reports back through one unbounded channel that the
//! runtime drains once per loop iteration.

use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

pub fn channel() -> (UiEventSender, UiEventReceiver) {
    mpsc::unbounded_channel()
}
