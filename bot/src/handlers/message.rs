use std::collections::HashSet;

use api::proto::{CommonUpdate, Message, UpdateType};
use async_trait::async_trait;
use compact_str::CompactString;
use eyre::eyre;
use log::{debug, warn};

use crate::{filter::SenderFilter, handler::Handler};

/// Runs a callback for the effective message of accepted updates.
/// Only new messages are accepted unless more kinds are allowed.
pub struct MessageHandler<F> {
    name: CompactString,
    kinds: HashSet<UpdateType>,
    filter: SenderFilter,
    callback: F,
}

impl<F> MessageHandler<F>
where
    F: FnMut(&Message) -> eyre::Result<()> + Send,
{
    pub fn new(name: &str, callback: F) -> Self {
        Self {
            name: name.into(),
            kinds: [UpdateType::Message].into(),
            filter: SenderFilter::Any,
            callback,
        }
    }

    pub fn allow(mut self, kind: UpdateType) -> Self {
        if kind.carries_message() {
            self.kinds.insert(kind);
        } else {
            warn!("'{}' ignores '{kind}' updates, they carry no message", self.name);
        }
        self
    }

    pub fn with_edits(self) -> Self {
        self.allow(UpdateType::EditedMessage)
    }

    pub fn with_channel_posts(self) -> Self {
        self.allow(UpdateType::ChannelPost)
    }

    pub fn with_filter(mut self, filter: SenderFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl<F> Handler for MessageHandler<F>
where
    F: FnMut(&Message) -> eyre::Result<()> + Send,
{
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn check_update(&self, update: &CommonUpdate) -> bool {
        let Some(kind) = update.kind() else {
            return false;
        };
        self.kinds.contains(&kind)
            && update
                .effective_message()
                .is_some_and(|message| self.filter.matches(&message.sender()))
    }

    async fn handle_update(&mut self, update: &CommonUpdate) -> eyre::Result<()> {
        let message = update
            .effective_message()
            .ok_or_else(|| eyre!("update {} has no message for '{}'", update.id, self.name))?;
        debug!("'{}' handles message {} from {}", self.name, message.message_id, message.sender());
        (self.callback)(message)
    }
}
