use api::proto::{CommonUpdate, Message, Update};
use async_trait::async_trait;
use compact_str::CompactString;
use eyre::eyre;
use log::debug;

use crate::{command::BotCommandInfo, filter::SenderFilter, handler::Handler};

/// Runs a callback for new messages carrying one command.
pub struct CommandHandler<F> {
    command: CompactString,
    bot_username: Option<CompactString>,
    filter: SenderFilter,
    callback: F,
}

impl<F> CommandHandler<F>
where
    F: FnMut(&BotCommandInfo, &Message) -> eyre::Result<()> + Send,
{
    pub fn new(command: &str, callback: F) -> Self {
        Self {
            command: command.into(),
            bot_username: None,
            filter: SenderFilter::Any,
            callback,
        }
    }

    /// Ignore commands addressed to other bots, like `/start@other_bot`.
    pub fn for_bot(mut self, bot_username: &str) -> Self {
        self.bot_username = Some(bot_username.trim_start_matches('@').into());
        self
    }

    pub fn with_filter(mut self, filter: SenderFilter) -> Self {
        self.filter = filter;
        self
    }

    fn parse(&self, update: &CommonUpdate) -> Option<BotCommandInfo> {
        let Update::Message(message) = &update.data else {
            return None;
        };
        let cmd = BotCommandInfo::try_from(message).ok()?;
        let addressed = match self.bot_username.as_deref() {
            Some(bot_username) => cmd.is_addressed_to(bot_username),
            None => true,
        };
        (addressed && cmd.name() == &self.command).then_some(cmd)
    }
}

#[async_trait]
impl<F> Handler for CommandHandler<F>
where
    F: FnMut(&BotCommandInfo, &Message) -> eyre::Result<()> + Send,
{
    fn name(&self) -> &str {
        self.command.as_str()
    }

    fn check_update(&self, update: &CommonUpdate) -> bool {
        update
            .effective_message()
            .is_some_and(|message| self.filter.matches(&message.sender()))
            && self.parse(update).is_some()
    }

    async fn handle_update(&mut self, update: &CommonUpdate) -> eyre::Result<()> {
        let cmd = self
            .parse(update)
            .ok_or_else(|| eyre!("update {} is not a '{}' command", update.id, self.command))?;
        let message = update
            .effective_message()
            .ok_or_else(|| eyre!("update {} has no message", update.id))?;
        debug!("/{} from {}, query = '{}'", cmd.name(), message.sender(), cmd.query());
        (self.callback)(&cmd, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::proto::{Chat, MessageEntity, MessageEntityType, User};

    fn command_update(id: i64, text: &str, from: User) -> CommonUpdate {
        let length = text.split(' ').next().map_or(0, str::len);
        let message = Message {
            message_id: 20,
            chat: Chat {
                id: 1,
                ..Default::default()
            },
            from: Some(from),
            text: Some(text.into()),
            entities: Some(vec![MessageEntity {
                entity_type: MessageEntityType::BotCommand,
                offset: 0,
                length,
                url: None,
                user: None,
                language: None,
                custom_emoji_id: None,
            }]),
            ..Default::default()
        };
        CommonUpdate {
            id,
            data: Update::Message(message),
        }
    }

    fn user(is_bot: bool) -> User {
        User {
            id: 3,
            is_bot,
            first_name: "Sam".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn runs_matching_command() {
        let mut queries = Vec::new();
        let mut handler = CommandHandler::new("echo", |cmd: &BotCommandInfo, _: &Message| {
            queries.push(cmd.query().to_string());
            Ok(())
        })
        .for_bot("@herald_bot");

        let mine = command_update(1, "/echo@herald_bot hi there", user(false));
        let plain = command_update(2, "/echo again", user(false));
        let other_bot = command_update(3, "/echo@other_bot hi", user(false));
        let other_cmd = command_update(4, "/start", user(false));

        assert!(handler.check_update(&mine));
        assert!(handler.check_update(&plain));
        assert!(!handler.check_update(&other_bot));
        assert!(!handler.check_update(&other_cmd));

        handler.handle_update(&mine).await.unwrap();
        handler.handle_update(&plain).await.unwrap();
        assert!(handler.handle_update(&other_cmd).await.is_err());
        drop(handler);
        insta::assert_snapshot!(queries.join("|"), @"hi there|again");
    }

    #[test]
    fn ignores_edited_commands() {
        let handler = CommandHandler::new("echo", |_: &BotCommandInfo, _: &Message| Ok(()));
        let mut update = command_update(1, "/echo", user(false));
        if let Update::Message(message) = update.data {
            update.data = Update::EditedMessage(message);
        }
        assert!(!handler.check_update(&update));
    }

    #[test]
    fn sender_filter_applies() {
        let handler = CommandHandler::new("echo", |_: &BotCommandInfo, _: &Message| Ok(()))
            .with_filter(SenderFilter::Bot);
        assert!(handler.check_update(&command_update(1, "/echo", user(true))));
        assert!(!handler.check_update(&command_update(2, "/echo", user(false))));
    }
}
