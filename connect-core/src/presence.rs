//! Which users are connected and which connections hear which rooms.
//!
//! A [`PresenceRegistry`] is owned by whatever runs the real-time transport.
//! Each connection is subscribed to its user's personal room on
//! [`PresenceRegistry::connect`] and may additionally subscribe to group
//! rooms. [`PresenceRegistry::deliveries`] resolves a message target to the
//! connections that should receive it.
//!
//! The registry is plain data behind `&mut self`; share it across tasks by
//! wrapping it in a mutex.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::{ConnectionId, GroupId, MessageTarget, UserId};

/// A broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Room {
    /// Every connection belonging to one user.
    Personal(UserId),
    /// Every connection that joined a group's room.
    Group(GroupId),
}

/// A change in a user's online state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "event", content = "user", rename_all = "camelCase")
)]
pub enum PresenceEvent {
    /// The user's first connection opened.
    Online(UserId),
    /// The user's last connection closed.
    Offline(UserId),
}

/// Registry of live connections and room subscriptions.
///
/// # Examples
/// ```
/// use connect_core::{ConnectionId, MessageTarget, PresenceEvent, PresenceRegistry, UserId};
///
/// let mut registry = PresenceRegistry::default();
/// let ada = UserId::new(1);
/// assert_eq!(
///     registry.connect(ada, ConnectionId::new(10)),
///     vec![PresenceEvent::Online(ada)]
/// );
/// assert!(registry.connect(ada, ConnectionId::new(11)).is_empty());
/// assert_eq!(
///     registry.deliveries(&MessageTarget::User(ada)),
///     vec![ConnectionId::new(10), ConnectionId::new(11)]
/// );
/// ```
#[derive(Debug, Default, Clone)]
pub struct PresenceRegistry {
    owners: BTreeMap<ConnectionId, UserId>,
    rooms: BTreeMap<Room, BTreeSet<ConnectionId>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` for `user` and subscribe it to the personal room.
    ///
    /// Returns the presence transitions in the order they happened. A
    /// connection already registered to another user is moved: the previous
    /// owner's [`PresenceEvent::Offline`] comes first when that was their
    /// last connection, then [`PresenceEvent::Online`] when this is `user`'s
    /// first live connection.
    pub fn connect(&mut self, user: UserId, connection: ConnectionId) -> Vec<PresenceEvent> {
        if self.owners.get(&connection) == Some(&user) {
            return Vec::new();
        }
        let mut events: Vec<PresenceEvent> = self.disconnect(connection).into_iter().collect();
        if !self.is_online(user) {
            debug!("user {user} online via connection {connection}");
            events.push(PresenceEvent::Online(user));
        }
        self.owners.insert(connection, user);
        self.subscribe(Room::Personal(user), connection);
        events
    }

    /// Drop `connection` and every subscription it held.
    ///
    /// Returns [`PresenceEvent::Offline`] when it was the user's last live
    /// connection. Unknown connections are ignored.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Option<PresenceEvent> {
        let user = self.owners.remove(&connection)?;
        self.rooms.retain(|_, members| {
            members.remove(&connection);
            !members.is_empty()
        });
        if self.is_online(user) {
            None
        } else {
            debug!("user {user} offline");
            Some(PresenceEvent::Offline(user))
        }
    }

    /// Subscribe a registered connection to a group room.
    ///
    /// Returns `false` when the connection is unknown.
    pub fn join_group(&mut self, connection: ConnectionId, group: GroupId) -> bool {
        if !self.owners.contains_key(&connection) {
            return false;
        }
        self.subscribe(Room::Group(group), connection);
        true
    }

    /// Unsubscribe a connection from a group room.
    ///
    /// Returns `false` when the connection was not subscribed.
    pub fn leave_group(&mut self, connection: ConnectionId, group: GroupId) -> bool {
        let room = Room::Group(group);
        let Some(members) = self.rooms.get_mut(&room) else {
            return false;
        };
        let removed = members.remove(&connection);
        if members.is_empty() {
            self.rooms.remove(&room);
        }
        removed
    }

    /// Connections that must receive a message sent to `target`, ascending.
    #[must_use]
    pub fn deliveries(&self, target: &MessageTarget) -> Vec<ConnectionId> {
        let room = match *target {
            MessageTarget::User(user) => Room::Personal(user),
            MessageTarget::Group(group) => Room::Group(group),
        };
        self.subscribers(room)
    }

    /// Connections subscribed to `room`, ascending.
    #[must_use]
    pub fn subscribers(&self, room: Room) -> Vec<ConnectionId> {
        self.rooms
            .get(&room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Report whether `user` has at least one live connection.
    #[must_use]
    pub fn is_online(&self, user: UserId) -> bool {
        self.rooms.contains_key(&Room::Personal(user))
    }

    /// Users with at least one live connection, ascending.
    #[must_use]
    pub fn online_users(&self) -> Vec<UserId> {
        self.rooms
            .keys()
            .filter_map(|room| match room {
                Room::Personal(user) => Some(*user),
                Room::Group(_) => None,
            })
            .collect()
    }

    fn subscribe(&mut self, room: Room, connection: ConnectionId) {
        self.rooms.entry(room).or_default().insert(connection);
    }
}
