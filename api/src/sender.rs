use std::fmt::{Display, Formatter};

use compact_str::CompactString;

use crate::{
    basic_types::ChatIntId,
    proto::{Chat, Message, User},
};

/// Who sent a message: a user, or a chat speaking on its own behalf.
///
/// The server fills `from` with a placeholder user when a message is sent on
/// behalf of a chat, so every accessor here prefers the sender chat over the
/// user.
#[derive(Debug, Clone, Copy)]
pub struct Sender<'a> {
    pub user: Option<&'a User>,
    pub chat: Option<&'a Chat>,
    pub is_automatic_forward: bool,
    /// Id of the chat the message was posted in.
    pub chat_id: ChatIntId,
}

#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderKind {
    #[display(fmt = "user")]
    User,
    #[display(fmt = "bot")]
    Bot,
    #[display(fmt = "anonymous admin")]
    AnonymousAdmin,
    #[display(fmt = "anonymous channel")]
    AnonymousChannel,
    #[display(fmt = "linked channel")]
    LinkedChannel,
}

impl Message {
    pub fn sender(&self) -> Sender<'_> {
        Sender {
            user: self.from.as_ref(),
            chat: self.sender_chat.as_ref(),
            is_automatic_forward: self.is_automatic_forward,
            chat_id: self.chat.id,
        }
    }
}

impl<'a> Sender<'a> {
    /// Sender chat id if there is one, the user id otherwise, 0 if neither.
    pub fn id(&self) -> i64 {
        match (self.chat, self.user) {
            (Some(chat), _) => chat.id,
            (None, Some(user)) => user.id,
            (None, None) => 0,
        }
    }

    pub fn username(&self) -> &'a str {
        match (self.chat, self.user) {
            (Some(chat), _) => chat.username.as_deref().unwrap_or_default(),
            (None, Some(user)) => user.username.as_deref().unwrap_or_default(),
            (None, None) => "",
        }
    }

    /// Chat title for a chat, full name for a user.
    pub fn name(&self) -> CompactString {
        match (self.chat, self.user) {
            (Some(chat), _) => chat.title.clone().unwrap_or_default(),
            (None, Some(user)) => user.full_name(),
            (None, None) => CompactString::default(),
        }
    }

    /// The title of a chat counts as its first name.
    pub fn first_name(&self) -> &'a str {
        match (self.chat, self.user) {
            (Some(chat), _) => chat.title.as_deref().unwrap_or_default(),
            (None, Some(user)) => user.first_name.as_str(),
            (None, None) => "",
        }
    }

    /// Always empty for a chat.
    pub fn last_name(&self) -> &'a str {
        match (self.chat, self.user) {
            (Some(_), _) | (None, None) => "",
            (None, Some(user)) => user.last_name.as_deref().unwrap_or_default(),
        }
    }

    /// Bots included.
    pub fn is_user(&self) -> bool {
        self.chat.is_none() && self.user.is_some()
    }

    /// False for the placeholder bot the server puts in `from` for chat senders.
    pub fn is_bot(&self) -> bool {
        self.chat.is_none() && self.user.is_some_and(|user| user.is_bot)
    }

    /// A group admin posting as the group itself.
    pub fn is_anonymous_admin(&self) -> bool {
        self.chat.is_some_and(|chat| chat.id == self.chat_id)
    }

    /// A channel posting into a group it does not own.
    pub fn is_anonymous_channel(&self) -> bool {
        self.chat
            .is_some_and(|chat| chat.id != self.chat_id && !self.is_automatic_forward)
    }

    /// A channel post forwarded automatically into its discussion group.
    pub fn is_linked_channel(&self) -> bool {
        self.chat
            .is_some_and(|chat| chat.id != self.chat_id && self.is_automatic_forward)
    }

    pub fn kind(&self) -> Option<SenderKind> {
        if self.is_anonymous_admin() {
            Some(SenderKind::AnonymousAdmin)
        } else if self.is_anonymous_channel() {
            Some(SenderKind::AnonymousChannel)
        } else if self.is_linked_channel() {
            Some(SenderKind::LinkedChannel)
        } else if self.is_bot() {
            Some(SenderKind::Bot)
        } else if self.is_user() {
            Some(SenderKind::User)
        } else {
            None
        }
    }
}

impl Display for Sender<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let username = self.username();
        if !username.is_empty() {
            write!(f, "@{username} ")?;
        }
        write!(f, "{} ({})", self.name(), self.id())
    }
}
