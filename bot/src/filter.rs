use api::{
    basic_types::ChatIntId,
    sender::{Sender, SenderKind},
};

/// Narrows a handler down to messages from one kind of sender.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SenderFilter {
    #[default]
    Any,
    /// Users, bots included.
    User,
    Bot,
    AnonymousAdmin,
    AnonymousChannel,
    LinkedChannel,
    /// A single user or chat, by the id the sender resolves to.
    Id(ChatIntId),
}

impl SenderFilter {
    pub fn matches(&self, sender: &Sender) -> bool {
        match self {
            SenderFilter::Any => true,
            SenderFilter::User => sender.is_user(),
            SenderFilter::Bot => sender.is_bot(),
            SenderFilter::AnonymousAdmin => sender.is_anonymous_admin(),
            SenderFilter::AnonymousChannel => sender.is_anonymous_channel(),
            SenderFilter::LinkedChannel => sender.is_linked_channel(),
            SenderFilter::Id(id) => sender.kind().is_some() && sender.id() == *id,
        }
    }
}

impl From<SenderKind> for SenderFilter {
    fn from(kind: SenderKind) -> Self {
        match kind {
            SenderKind::User => SenderFilter::User,
            SenderKind::Bot => SenderFilter::Bot,
            SenderKind::AnonymousAdmin => SenderFilter::AnonymousAdmin,
            SenderKind::AnonymousChannel => SenderFilter::AnonymousChannel,
            SenderKind::LinkedChannel => SenderFilter::LinkedChannel,
        }
    }
}
