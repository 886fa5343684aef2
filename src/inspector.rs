use api::proto::{CommonUpdate, Update};
use async_trait::async_trait;
use bot::handler::Handler;
use compact_str::{CompactString, ToCompactString};
use log::info;
use std::collections::BTreeMap;

const NO_SENDER: &str = "nobody";

/// Logs every update it sees and counts update kinds and sender kinds.
#[derive(Debug, Default)]
pub struct Inspector {
    kinds: BTreeMap<CompactString, usize>,
    senders: BTreeMap<CompactString, usize>,
}

impl Inspector {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn summary(&self) -> String {
        [("updates", &self.kinds), ("senders", &self.senders)]
            .into_iter()
            .map(|(name, tally)| {
                let counts = tally
                    .iter()
                    .map(|(key, count)| format!("{key}={count}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{name}: {counts}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Handler for Inspector {
    fn name(&self) -> &str {
        "inspector"
    }

    fn check_update(&self, _update: &CommonUpdate) -> bool {
        true
    }

    async fn handle_update(&mut self, update: &CommonUpdate) -> eyre::Result<()> {
        let kind = match &update.data {
            Update::Unknown { kind } => kind.clone(),
            data => data
                .kind()
                .map(|kind| kind.as_str().into())
                .unwrap_or_default(),
        };
        *self.kinds.entry(kind.clone()).or_default() += 1;

        match update.effective_message() {
            Some(message) => {
                let sender = message.sender();
                let sender_kind = sender
                    .kind()
                    .map_or_else(|| NO_SENDER.into(), |kind| kind.to_compact_string());
                info!(
                    "update {} ({kind}): message {} in chat {} from {sender} [{sender_kind}]",
                    update.id, message.message_id, message.chat.id
                );
                *self.senders.entry(sender_kind).or_default() += 1;
            }
            None => match update.effective_user() {
                Some(user) => info!(
                    "update {} ({kind}): from {} ({})",
                    update.id,
                    user.full_name(),
                    user.id
                ),
                None => info!("update {} ({kind}) carries nothing to inspect", update.id),
            },
        }
        Ok(())
    }
}
