//! Direct and group messages.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::label::labelled_enum;
use crate::user::non_blank;
use crate::{GroupId, MessageId, UserId};

labelled_enum! {
    /// Kind of payload a message carries.
    #[derive(Default)]
    MessageType as "message type" {
        /// Plain text.
        #[default]
        Text => "text",
        /// Image reference.
        Image => "image",
        /// File reference.
        File => "file",
    }
}

/// Errors returned when addressing a message.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MessageError {
    /// Neither a receiver nor a group was named.
    #[error("a message needs a receiver or a group")]
    MissingRecipient,
    /// Both a receiver and a group were named.
    #[error("a message cannot name both a receiver and a group")]
    AmbiguousRecipient,
    /// The content was empty after trimming.
    #[error("message content must not be empty")]
    EmptyContent,
}

/// Where a message is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum MessageTarget {
    /// A single user.
    User(UserId),
    /// Every member of a group.
    Group(GroupId),
}

/// A validated message awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    sender: UserId,
    target: MessageTarget,
    content: String,
    message_type: MessageType,
}

impl MessageDraft {
    /// Address a message to exactly one of `receiver` or `group`.
    ///
    /// # Errors
    /// Returns [`MessageError`] when the addressing is not exactly one
    /// recipient or the content is blank.
    ///
    /// # Examples
    /// ```
    /// use connect_core::{GroupId, MessageDraft, MessageError, MessageTarget, UserId};
    ///
    /// let draft = MessageDraft::new(UserId::new(1), None, Some(GroupId::new(4)), " hi ").unwrap();
    /// assert_eq!(draft.target(), MessageTarget::Group(GroupId::new(4)));
    /// assert_eq!(draft.content(), "hi");
    ///
    /// let err = MessageDraft::new(UserId::new(1), None, None, "hi").unwrap_err();
    /// assert_eq!(err, MessageError::MissingRecipient);
    /// ```
    pub fn new(
        sender: UserId,
        receiver: Option<UserId>,
        group: Option<GroupId>,
        content: &str,
    ) -> Result<Self, MessageError> {
        let target = match (receiver, group) {
            (Some(user), None) => MessageTarget::User(user),
            (None, Some(group)) => MessageTarget::Group(group),
            (None, None) => return Err(MessageError::MissingRecipient),
            (Some(_), Some(_)) => return Err(MessageError::AmbiguousRecipient),
        };
        let content = non_blank(content).ok_or(MessageError::EmptyContent)?;
        Ok(Self {
            sender,
            target,
            content,
            message_type: MessageType::Text,
        })
    }

    /// Set the payload kind.
    #[must_use]
    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    /// Sending user.
    #[must_use]
    pub const fn sender(&self) -> UserId {
        self.sender
    }

    /// Delivery target.
    #[must_use]
    pub const fn target(&self) -> MessageTarget {
        self.target
    }

    /// Trimmed content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Payload kind.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Stamp the draft as an unread message.
    #[must_use]
    pub fn into_message(self, id: MessageId, now: DateTime<Utc>) -> Message {
        Message {
            id,
            sender: self.sender,
            target: self.target,
            content: self.content,
            message_type: self.message_type,
            is_read: false,
            created_at: now,
        }
    }
}

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Message {
    /// Identity.
    pub id: MessageId,
    /// Sending user.
    pub sender: UserId,
    /// Delivery target.
    pub target: MessageTarget,
    /// Trimmed content.
    pub content: String,
    /// Payload kind.
    pub message_type: MessageType,
    /// Whether the receiver has opened the conversation since delivery.
    pub is_read: bool,
    /// Send time.
    pub created_at: DateTime<Utc>,
}

/// The latest state of one direct conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ConversationSummary {
    /// The other participant.
    pub partner: UserId,
    /// The other participant's display name.
    pub partner_name: String,
    /// Most recent message in either direction.
    pub last_message: Message,
    /// Messages from the partner the viewer has not read.
    pub unread_count: u32,
}
