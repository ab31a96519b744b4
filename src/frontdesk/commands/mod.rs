//! Business logic for each user-facing operation.
//!
//! Command functions are pure with respect to I/O: they read a snapshot and
//! return the actions to dispatch plus whatever the caller should show.
//! Dispatching, persistence, and syncing are the runtime's job; printing is
//! the CLI's.

use crate::state::Action;

pub mod checkin;
pub mod helpers;
pub mod note;
pub mod renew;
pub mod search;
pub mod status;

pub use helpers::MemberView;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Transitions for the runtime to dispatch, in order.
    pub actions: Vec<Action>,
    pub messages: Vec<CmdMessage>,
    pub members: Vec<MemberView>,
    pub status: Option<status::StatusReport>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_members(mut self, members: Vec<MemberView>) -> Self {
        self.members = members;
        self
    }

    pub fn with_status(mut self, status: status::StatusReport) -> Self {
        self.status = Some(status);
        self
    }
}
