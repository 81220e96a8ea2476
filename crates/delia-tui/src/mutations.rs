//! Cross-slice state mutations.
//!
//! Overlays return these mutations to request changes outside their own
//! slice. The main reducer applies them in order.

use delia_core::api::UserLevel;

#[derive(Debug)]
pub enum StateMutation {
    Transcript(TranscriptMutation),
    Session(SessionMutation),
}

#[derive(Debug)]
pub enum TranscriptMutation {
    AppendSystemMessage(String),
}

#[derive(Debug)]
pub enum SessionMutation {
    SetUserLevel(UserLevel),
}
