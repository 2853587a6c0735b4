//! Direct and group messaging.

use chrono::{DateTime, Utc};
use connect_core::{
    ConversationSummary, GroupId, Message, MessageDraft, MessageId, MessageTarget, UserId,
};
use log::debug;
use rusqlite::{OptionalExtension, Row, params};

use crate::store::{collect_ids, from_millis, inserted_id, to_millis};
use crate::{SqliteCommunityStore, StoreError};

/// Most messages a group history returns.
pub const GROUP_HISTORY_LIMIT: u32 = 100;

const MESSAGE_COLUMNS: &str =
    "id, sender, receiver, group_id, content, message_type, is_read, created_at";

struct MessageRow {
    id: u64,
    sender: u64,
    receiver: Option<u64>,
    group: Option<u64>,
    content: String,
    message_type: String,
    is_read: bool,
    created_at: i64,
}

impl MessageRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sender: row.get(1)?,
            receiver: row.get(2)?,
            group: row.get(3)?,
            content: row.get(4)?,
            message_type: row.get(5)?,
            is_read: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_message(self) -> Result<Message, StoreError> {
        let target = match (self.receiver, self.group) {
            (Some(user), None) => MessageTarget::User(UserId::new(user)),
            (None, Some(group)) => MessageTarget::Group(GroupId::new(group)),
            _ => return Err(StoreError::MessageTarget { id: self.id }),
        };
        Ok(Message {
            id: MessageId::new(self.id),
            sender: UserId::new(self.sender),
            target,
            content: self.content,
            message_type: self.message_type.parse()?,
            is_read: self.is_read,
            created_at: from_millis(self.created_at)?,
        })
    }
}

impl SqliteCommunityStore {
    /// Store a message as unread.
    ///
    /// Group messages are accepted from any registered user.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`] when the sender or receiver is missing,
    /// [`StoreError::UnknownGroup`] when the group is missing, or database
    /// failures.
    pub fn send_message(
        &mut self,
        draft: MessageDraft,
        now: DateTime<Utc>,
    ) -> Result<Message, StoreError> {
        self.require_user(draft.sender())?;
        let (receiver, group) = match draft.target() {
            MessageTarget::User(user) => {
                self.require_user(user)?;
                (Some(user.get()), None)
            }
            MessageTarget::Group(id) => {
                if self.group(id)?.is_none() {
                    return Err(StoreError::UnknownGroup { id });
                }
                (None, Some(id.get()))
            }
        };
        self.connection.execute(
            "INSERT INTO messages (sender, receiver, group_id, content, message_type, is_read,
                created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                draft.sender().get(),
                receiver,
                group,
                draft.content(),
                draft.message_type().as_str(),
                to_millis(now),
            ],
        )?;
        let id = MessageId::new(inserted_id(&self.connection)?);
        debug!("stored message {id} from user {}", draft.sender());
        Ok(draft.into_message(id, now))
    }

    /// Direct messages between `viewer` and `other`, oldest first.
    ///
    /// The history is returned as it was before the call; afterwards every
    /// message `other` sent to `viewer` is marked read.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn conversation(
        &mut self,
        viewer: UserId,
        other: UserId,
    ) -> Result<Vec<Message>, StoreError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE (sender = ?1 AND receiver = ?2) OR (sender = ?2 AND receiver = ?1)
             ORDER BY created_at, id"
        );
        let history = self.messages(&sql, params![viewer.get(), other.get()])?;
        let marked = self.connection.execute(
            "UPDATE messages SET is_read = 1 WHERE sender = ?1 AND receiver = ?2 AND is_read = 0",
            params![other.get(), viewer.get()],
        )?;
        if marked > 0 {
            debug!("marked {marked} messages from user {other} read for user {viewer}");
        }
        Ok(history)
    }

    /// The oldest messages posted to a group, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn group_messages(&self, group: GroupId) -> Result<Vec<Message>, StoreError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE group_id = ?1
             ORDER BY created_at, id
             LIMIT ?2"
        );
        self.messages(&sql, params![group.get(), GROUP_HISTORY_LIMIT])
    }

    /// One summary per direct-message partner, most recent first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn conversations(&self, viewer: UserId) -> Result<Vec<ConversationSummary>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT receiver FROM messages WHERE sender = ?1 AND receiver IS NOT NULL
             UNION
             SELECT sender FROM messages WHERE receiver = ?1",
        )?;
        let partners = collect_ids(statement.query_map(params![viewer.get()], |row| row.get(0))?)?;
        let last_sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE (sender = ?1 AND receiver = ?2) OR (sender = ?2 AND receiver = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );

        let mut summaries = Vec::with_capacity(partners.len());
        for raw in partners {
            let partner = UserId::new(raw);
            let Some(user) = self.user(partner)? else {
                continue;
            };
            let Some(last) = self
                .connection
                .query_row(&last_sql, params![viewer.get(), raw], MessageRow::read)
                .optional()?
            else {
                continue;
            };
            let unread_count: u32 = self.connection.query_row(
                "SELECT COUNT(*) FROM messages WHERE sender = ?1 AND receiver = ?2 AND is_read = 0",
                params![raw, viewer.get()],
                |row| row.get(0),
            )?;
            summaries.push(ConversationSummary {
                partner,
                partner_name: user.name,
                last_message: last.into_message()?,
                unread_count,
            });
        }
        summaries.sort_by(|a, b| {
            (b.last_message.created_at, b.last_message.id)
                .cmp(&(a.last_message.created_at, a.last_message.id))
        });
        Ok(summaries)
    }

    /// Number of direct messages waiting for `viewer`.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures.
    pub fn unread_count(&self, viewer: UserId) -> Result<u32, StoreError> {
        let count = self.connection.query_row(
            "SELECT COUNT(*) FROM messages WHERE receiver = ?1 AND is_read = 0",
            params![viewer.get()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn messages(
        &self,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<Message>, StoreError> {
        let mut statement = self.connection.prepare(sql)?;
        let rows = statement
            .query_map(args, MessageRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(MessageRow::into_message).collect()
    }
}
