use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use log::warn;
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::{
    basic_types::{ChatIntId, Date, MessageId, MessageThreadId, UpdateId, UserId},
    sender::Sender,
};

/// Kinds of updates this crate understands, listed in the order used to
/// pick one when a payload carries more than one of them.
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
}

impl UpdateType {
    pub const ALL: [UpdateType; 9] = [
        UpdateType::Message,
        UpdateType::EditedMessage,
        UpdateType::ChannelPost,
        UpdateType::EditedChannelPost,
        UpdateType::InlineQuery,
        UpdateType::ChosenInlineResult,
        UpdateType::CallbackQuery,
        UpdateType::ShippingQuery,
        UpdateType::PreCheckoutQuery,
    ];

    /// Field name of this kind in an update object.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Message => "message",
            UpdateType::EditedMessage => "edited_message",
            UpdateType::ChannelPost => "channel_post",
            UpdateType::EditedChannelPost => "edited_channel_post",
            UpdateType::InlineQuery => "inline_query",
            UpdateType::ChosenInlineResult => "chosen_inline_result",
            UpdateType::CallbackQuery => "callback_query",
            UpdateType::ShippingQuery => "shipping_query",
            UpdateType::PreCheckoutQuery => "pre_checkout_query",
        }
    }

    pub const fn carries_message(&self) -> bool {
        matches!(
            self,
            UpdateType::Message
                | UpdateType::EditedMessage
                | UpdateType::ChannelPost
                | UpdateType::EditedChannelPost
        )
    }
}

impl Display for UpdateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming update together with its server-assigned id.
/// https://core.telegram.org/bots/api#update
#[derive(Debug)]
pub struct CommonUpdate {
    pub id: UpdateId,
    pub data: Update,
}

#[derive(Debug)]
pub enum Update {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    /// A kind the server knows about and this crate does not model.
    Unknown { kind: CompactString },
}

impl Update {
    pub fn kind(&self) -> Option<UpdateType> {
        let kind = match self {
            Update::Message(_) => UpdateType::Message,
            Update::EditedMessage(_) => UpdateType::EditedMessage,
            Update::ChannelPost(_) => UpdateType::ChannelPost,
            Update::EditedChannelPost(_) => UpdateType::EditedChannelPost,
            Update::InlineQuery(_) => UpdateType::InlineQuery,
            Update::ChosenInlineResult(_) => UpdateType::ChosenInlineResult,
            Update::CallbackQuery(_) => UpdateType::CallbackQuery,
            Update::ShippingQuery(_) => UpdateType::ShippingQuery,
            Update::PreCheckoutQuery(_) => UpdateType::PreCheckoutQuery,
            Update::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// The message carried by message-bearing updates. Queries never
    /// contribute one, not even a callback query attached to a message.
    pub fn effective_message(&self) -> Option<&Message> {
        match self {
            Update::Message(message)
            | Update::EditedMessage(message)
            | Update::ChannelPost(message)
            | Update::EditedChannelPost(message) => Some(message),
            _ => None,
        }
    }

    pub fn effective_user(&self) -> Option<&User> {
        match self {
            Update::InlineQuery(query) => Some(&query.from),
            Update::ChosenInlineResult(result) => Some(&result.from),
            Update::CallbackQuery(query) => Some(&query.from),
            Update::ShippingQuery(query) => Some(&query.from),
            Update::PreCheckoutQuery(query) => Some(&query.from),
            _ => self.effective_message().and_then(|m| m.from.as_ref()),
        }
    }

    pub fn effective_chat(&self) -> Option<&Chat> {
        match self {
            Update::CallbackQuery(query) => query.message.as_deref().map(|m| &m.chat),
            _ => self.effective_message().map(|m| &m.chat),
        }
    }

    pub fn effective_sender(&self) -> Option<Sender<'_>> {
        self.effective_message().map(Message::sender)
    }
}

impl CommonUpdate {
    pub fn kind(&self) -> Option<UpdateType> {
        self.data.kind()
    }

    pub fn effective_message(&self) -> Option<&Message> {
        self.data.effective_message()
    }

    pub fn effective_user(&self) -> Option<&User> {
        self.data.effective_user()
    }

    pub fn effective_chat(&self) -> Option<&Chat> {
        self.data.effective_chat()
    }

    pub fn effective_sender(&self) -> Option<Sender<'_>> {
        self.data.effective_sender()
    }
}

fn parse_payload<T: DeserializeOwned, E: de::Error>(
    kind: UpdateType,
    value: Value,
) -> Result<T, E> {
    serde_json::from_value::<T>(value)
        .map_err(|err| de::Error::custom(format!("malformed '{kind}' update: {err}")))
}

impl<'de> Deserialize<'de> for CommonUpdate {
    fn deserialize<D>(deserializer: D) -> Result<CommonUpdate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = Map::deserialize(deserializer)?;

        let id = map
            .remove("update_id")
            .ok_or_else(|| <D::Error as de::Error>::missing_field("update_id"))
            .map(UpdateId::deserialize)?
            .map_err(<D::Error as de::Error>::custom)?;

        let Some((kind, value)) = UpdateType::ALL
            .into_iter()
            .find_map(|kind| map.remove(kind.as_str()).map(|value| (kind, value)))
        else {
            return match map.into_iter().next() {
                Some((kind, _)) => Ok(CommonUpdate {
                    id,
                    data: Update::Unknown { kind: kind.into() },
                }),
                None => Err(<D::Error as de::Error>::custom("update with no data")),
            };
        };

        if !map.is_empty() {
            let ignored = map.keys().map(String::as_str).collect::<Vec<_>>();
            warn!("update {id} carries more than one kind, using '{kind}', ignoring {ignored:?}");
        }

        let data: Result<Update, D::Error> = match kind {
            UpdateType::Message => parse_payload(kind, value).map(Update::Message),
            UpdateType::EditedMessage => parse_payload(kind, value).map(Update::EditedMessage),
            UpdateType::ChannelPost => parse_payload(kind, value).map(Update::ChannelPost),
            UpdateType::EditedChannelPost => {
                parse_payload(kind, value).map(Update::EditedChannelPost)
            }
            UpdateType::InlineQuery => parse_payload(kind, value).map(Update::InlineQuery),
            UpdateType::ChosenInlineResult => {
                parse_payload(kind, value).map(Update::ChosenInlineResult)
            }
            UpdateType::CallbackQuery => parse_payload(kind, value).map(Update::CallbackQuery),
            UpdateType::ShippingQuery => parse_payload(kind, value).map(Update::ShippingQuery),
            UpdateType::PreCheckoutQuery => {
                parse_payload(kind, value).map(Update::PreCheckoutQuery)
            }
        };
        Ok(CommonUpdate { id, data: data? })
    }
}

/// This object represents an incoming inline query.
/// https://core.telegram.org/bots/api#inlinequery
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize)]
pub struct InlineQuery {
    pub id: CompactString,
    pub from: User,
    pub query: CompactString,
    pub offset: CompactString,
    pub chat_type: Option<ChatType>,
    pub location: Option<Location>,
}

/// Represents a result of an inline query that was chosen by the user and sent to their chat partner.
/// https://core.telegram.org/bots/api#choseninlineresult
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize)]
pub struct ChosenInlineResult {
    pub result_id: CompactString,
    pub from: User,
    pub location: Option<Location>,
    pub inline_message_id: Option<CompactString>,
    pub query: CompactString,
}

/// https://core.telegram.org/bots/api#callbackquery
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: CompactString,
    pub from: User,
    pub message: Option<Box<Message>>,
    pub inline_message_id: Option<CompactString>,
    pub chat_instance: Option<CompactString>,
    pub data: Option<CompactString>,
    pub game_short_name: Option<CompactString>,
}

/// https://core.telegram.org/bots/api#shippingquery
#[derive(Debug, Deserialize, Serialize)]
pub struct ShippingQuery {
    pub id: CompactString,
    pub from: User,
    pub invoice_payload: CompactString,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShippingAddress {
    pub country_code: CompactString,
    pub state: CompactString,
    pub city: CompactString,
    pub street_line1: CompactString,
    pub street_line2: CompactString,
    pub post_code: CompactString,
}

/// This object contains information about an incoming pre-checkout query.
/// https://core.telegram.org/bots/api#precheckoutquery
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize)]
pub struct PreCheckoutQuery {
    pub id: CompactString,
    pub from: User,
    pub currency: CompactString,
    /// Amount in the smallest units of the currency.
    pub total_amount: u64,
    pub invoice_payload: CompactString,
    pub shipping_option_id: Option<CompactString>,
    pub order_info: Option<OrderInfo>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize)]
pub struct OrderInfo {
    pub name: Option<CompactString>,
    pub phone_number: Option<CompactString>,
    pub email: Option<CompactString>,
    pub shipping_address: Option<ShippingAddress>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub horizontal_accuracy: Option<f64>,
    pub live_period: Option<i64>,
    pub heading: Option<i64>,
}

/// https://core.telegram.org/bots/api#user
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: CompactString,
    pub last_name: Option<CompactString>,
    pub username: Option<CompactString>,
    pub language_code: Option<CompactString>,
    pub is_premium: Option<bool>,
}

impl User {
    /// First name and last name separated by a space, or just the first name.
    pub fn full_name(&self) -> CompactString {
        let mut name = self.first_name.clone();
        match self.last_name.as_deref() {
            Some(last_name) if !last_name.is_empty() => {
                name.push(' ');
                name.push_str(last_name);
            }
            _ => {}
        }
        name
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    Sender,
    #[default]
    Private,
    Group,
    Supergroup,
    Channel,
}

/// https://core.telegram.org/bots/api#chat
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Chat {
    pub id: ChatIntId,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub title: Option<CompactString>,
    pub username: Option<CompactString>,
    pub first_name: Option<CompactString>,
    pub last_name: Option<CompactString>,
    pub is_forum: Option<bool>,
}

/// This object represents one special entity in a text message. For example, hashtags, usernames, URLs, etc.
/// https://core.telegram.org/bots/api#messageentity
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub entity_type: MessageEntityType,
    pub offset: usize,
    pub length: usize,
    pub url: Option<CompactString>,
    pub user: Option<User>,
    pub language: Option<CompactString>,
    pub custom_emoji_id: Option<CompactString>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageEntityType {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
    Blockquote,
    ExpandableBlockquote,
    /// An entity type introduced after this list was written.
    #[serde(other)]
    Unknown,
}

/// https://core.telegram.org/bots/api#message
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Message {
    pub message_id: MessageId,
    pub message_thread_id: Option<MessageThreadId>,
    pub from: Option<User>,
    pub sender_chat: Option<Chat>,
    pub date: Date,
    pub chat: Chat,
    pub forward_from: Option<User>,
    pub forward_from_chat: Option<Chat>,
    pub forward_from_message_id: Option<MessageId>,
    pub forward_signature: Option<CompactString>,
    pub forward_sender_name: Option<CompactString>,
    pub forward_date: Option<Date>,
    #[serde(default)]
    pub is_automatic_forward: bool,
    pub reply_to_message: Option<Box<Message>>,
    pub via_bot: Option<User>,
    pub edit_date: Option<Date>,
    pub media_group_id: Option<CompactString>,
    pub author_signature: Option<CompactString>,
    pub text: Option<CompactString>,
    pub entities: Option<Vec<MessageEntity>>,
    pub caption: Option<CompactString>,
    pub caption_entities: Option<Vec<MessageEntity>>,
}

impl Message {
    /// First entity of the given type in the message text.
    pub fn entity_of(&self, entity_type: MessageEntityType) -> Option<&MessageEntity> {
        self.entities
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|entity| entity.entity_type == entity_type)
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edit_date
            .and_then(|date| DateTime::from_timestamp(date, 0))
    }
}
