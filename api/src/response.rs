use compact_str::CompactString;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use crate::proto::CommonUpdate;

/// Envelope the server wraps every method result in, `getUpdates` included.
#[derive(Debug)]
pub enum CommonResponse<R> {
    Ok(R),
    Err(ErrorResponse),
}

impl<R> From<CommonResponse<R>> for Result<R, ErrorResponse> {
    fn from(response: CommonResponse<R>) -> Self {
        match response {
            CommonResponse::Ok(result) => Ok(result),
            CommonResponse::Err(error) => Err(error),
        }
    }
}

impl<R> CommonResponse<R> {
    pub fn into_result(self) -> Result<R, ErrorResponse> {
        self.into()
    }
}

/// A refused request, e.g. a recorded `getUpdates` that hit a conflict.
#[derive(Debug)]
pub struct ErrorResponse {
    pub description: CompactString,
    pub error_code: i64,
}

impl Display for ErrorResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "server refused with {}: {}", self.error_code, self.description)
    }
}

impl Error for ErrorResponse {}

#[derive(Deserialize)]
struct RawResponse<R> {
    ok: bool,
    result: Option<R>,
    description: Option<CompactString>,
    error_code: Option<i64>,
}

impl<'de, R: Deserialize<'de>> Deserialize<'de> for CommonResponse<R> {
    fn deserialize<D>(deserializer: D) -> Result<CommonResponse<R>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawResponse::<R>::deserialize(deserializer)?;
        if raw.ok {
            return raw
                .result
                .map(CommonResponse::Ok)
                .ok_or_else(|| <D::Error as de::Error>::missing_field("result"));
        }
        let error_code = raw
            .error_code
            .ok_or_else(|| <D::Error as de::Error>::missing_field("error_code"))?;
        Ok(CommonResponse::Err(ErrorResponse {
            description: raw.description.unwrap_or_default(),
            error_code,
        }))
    }
}

/// Reads either a recorded `getUpdates` response or a single update as a
/// webhook would receive it.
pub fn parse_updates(text: &str) -> eyre::Result<Vec<CommonUpdate>> {
    let value = serde_json::from_str::<Value>(text)?;
    if value.get("ok").is_some() {
        let updates = serde_json::from_value::<CommonResponse<Vec<CommonUpdate>>>(value)?
            .into_result()?;
        Ok(updates)
    } else {
        Ok(vec![serde_json::from_value::<CommonUpdate>(value)?])
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::proto::{Message, MessageEntityType, UpdateType};

    #[test]
    fn deserialize_response_check() {
        let message = json!({
            "ok": true,
            "result": {
                "message_id": 123,
                "date": 2345,
                "chat": {
                    "id": 1,
                    "type": "group",
                }
            }
        });
        let response = serde_json::from_value::<CommonResponse<Message>>(message).unwrap();
        let_assert!(CommonResponse::Ok(message) = response);
        check!(message.message_id == 123);

        let message = json!({"ok":true,"result":true,"description":"Webhook was set"});
        let_assert!(
            Ok(true) = serde_json::from_value::<CommonResponse<bool>>(message)
                .unwrap()
                .into_result()
        );
    }

    #[test]
    fn error_response() {
        let response = json!({
            "ok": false,
            "error_code": 409,
            "description": "Conflict: terminated by other getUpdates request"
        });
        let_assert!(
            Err(err) = serde_json::from_value::<CommonResponse<bool>>(response)
                .unwrap()
                .into_result()
        );
        check!(err.error_code == 409);
        check!(err.to_string().starts_with("server refused with 409: Conflict"));
    }

    #[test]
    fn parse_update_batch() {
        let text = json!({
            "ok": true,
            "result": [
                {
                    "update_id": 1,
                    "message": {"message_id": 1, "date": 0, "chat": {"id": 5, "type": "private"}}
                },
                {
                    "update_id": 2,
                    "inline_query": {
                        "id": "q",
                        "from": {"id": 5, "first_name": "A"},
                        "query": "",
                        "offset": ""
                    }
                }
            ]
        })
        .to_string();
        let updates = parse_updates(&text).unwrap();
        check!(updates.len() == 2);
        check!(updates[0].kind() == Some(UpdateType::Message));
        check!(updates[1].kind() == Some(UpdateType::InlineQuery));
    }

    #[test]
    fn batch_survives_unlisted_entity_type() {
        let text = json!({
            "ok": true,
            "result": [
                {
                    "update_id": 1,
                    "message": {"message_id": 1, "date": 0, "chat": {"id": 5, "type": "private"}}
                },
                {
                    "update_id": 2,
                    "message": {
                        "message_id": 2,
                        "date": 0,
                        "chat": {"id": 5, "type": "private"},
                        "text": "quoted",
                        "entities": [{"type": "blockquote", "offset": 0, "length": 6}]
                    }
                }
            ]
        })
        .to_string();
        let updates = parse_updates(&text).unwrap();
        check!(updates.len() == 2);
        let_assert!(Some(message) = updates[1].effective_message());
        check!(message.entity_of(MessageEntityType::Blockquote).is_some());
    }

    #[test]
    fn parse_single_update() {
        let text = r#"{"update_id": 3, "channel_post": {"message_id": 9, "date": 0, "chat": {"id": -1, "type": "channel"}}}"#;
        let updates = parse_updates(text).unwrap();
        check!(updates.len() == 1);
        check!(updates[0].id == 3);
    }

    #[test]
    fn parse_failed_batch() {
        let text = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let_assert!(Err(err) = parse_updates(text));
        check!(err.to_string() == "server refused with 401: Unauthorized");
    }
}
