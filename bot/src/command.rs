use api::proto::{Message, MessageEntity, MessageEntityType};
use compact_str::CompactString;
use eyre::bail;

/// A command split out of message text: `/name@bot query`.
#[derive(Debug, PartialEq, Eq)]
pub struct BotCommandInfo {
    name: CompactString,
    target: Option<CompactString>,
    query: CompactString,
}

impl TryFrom<&Message> for BotCommandInfo {
    type Error = eyre::Report;

    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        let Some(text) = message.text.as_ref() else {
            bail!("no text for bot command in message {}", message.message_id);
        };
        let info = match message.entity_of(MessageEntityType::BotCommand) {
            Some(entity) if entity.offset == 0 => Self::from_command(text, entity),
            _ => Self::from_text(text),
        };
        if info.name.is_empty() {
            bail!("empty bot command in message {}", message.message_id);
        }
        Ok(info)
    }
}

impl BotCommandInfo {
    pub fn name(&self) -> &CompactString {
        &self.name
    }

    /// Bot username the command was addressed to, without the '@'.
    pub fn target(&self) -> Option<&CompactString> {
        self.target.as_ref()
    }

    pub fn query(&self) -> &CompactString {
        &self.query
    }

    /// True unless the command names some other bot.
    pub fn is_addressed_to(&self, bot_username: &str) -> bool {
        self.target
            .as_ref()
            .map_or(true, |target| target.eq_ignore_ascii_case(bot_username))
    }

    fn from_command(text: &str, bot_command_entity: &MessageEntity) -> Self {
        // entity lengths count UTF-16 units, commands themselves are ASCII
        let (cmd, query) = match text.get(..bot_command_entity.length) {
            Some(cmd) => (cmd, &text[cmd.len()..]),
            None => text.split_once(' ').unwrap_or((text, "")),
        };
        let cmd = cmd.strip_prefix('/').unwrap_or(cmd);
        Self::split_target(cmd, query.trim_start())
    }

    fn from_text(text: &str) -> Self {
        let (cmd, query) = text.split_once(' ').unwrap_or((text, ""));
        let cmd = cmd.strip_prefix('/').unwrap_or(cmd);
        Self::split_target(cmd, query.trim_start())
    }

    fn split_target(cmd: &str, query: &str) -> Self {
        let (name, target) = match cmd.split_once('@') {
            Some((name, target)) => (name, Some(target.into())),
            None => (cmd, None),
        };
        Self {
            name: name.into(),
            target,
            query: query.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::proto::Chat;

    fn message(text: &str, command_length: Option<usize>) -> Message {
        let entities = command_length.map(|length| {
            vec![MessageEntity {
                entity_type: MessageEntityType::BotCommand,
                offset: 0,
                length,
                url: None,
                user: None,
                language: None,
                custom_emoji_id: None,
            }]
        });
        Message {
            message_id: 3,
            chat: Chat {
                id: 1,
                ..Default::default()
            },
            text: Some(text.into()),
            entities,
            ..Default::default()
        }
    }

    #[test]
    fn command_with_entity() {
        let cmd = BotCommandInfo::try_from(&message("/start@herald_bot deep link", Some(17)))
            .unwrap();
        assert_eq!(cmd.name(), "start");
        assert_eq!(cmd.target().map(|t| t.as_str()), Some("herald_bot"));
        assert_eq!(cmd.query(), "deep link");
        assert!(cmd.is_addressed_to("Herald_Bot"));
        assert!(!cmd.is_addressed_to("other_bot"));
    }

    #[test]
    fn command_without_entity() {
        let cmd = BotCommandInfo::try_from(&message("pls cats", None)).unwrap();
        assert_eq!(cmd.name(), "pls");
        assert_eq!(cmd.target(), None);
        assert_eq!(cmd.query(), "cats");
        assert!(cmd.is_addressed_to("anyone"));
    }

    #[test]
    fn slash_command_without_entity() {
        let cmd = BotCommandInfo::try_from(&message("/echo@herald_bot hi there", None)).unwrap();
        assert_eq!(cmd.name(), "echo");
        assert_eq!(cmd.target().map(|t| t.as_str()), Some("herald_bot"));
        assert_eq!(cmd.query(), "hi there");
    }

    #[test]
    fn entity_longer_than_text() {
        let cmd = BotCommandInfo::try_from(&message("/help", Some(40))).unwrap();
        assert_eq!(cmd.name(), "help");
        assert_eq!(cmd.query(), "");
    }

    #[test]
    fn message_without_text() {
        let mut message = message("", None);
        message.text = None;
        assert!(BotCommandInfo::try_from(&message).is_err());
    }

    #[test]
    fn empty_command() {
        assert!(BotCommandInfo::try_from(&message("/", Some(1))).is_err());
    }
}
