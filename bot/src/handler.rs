use api::proto::CommonUpdate;
use async_trait::async_trait;

/// Something that reacts to updates. Callers ask `check_update` first and
/// only pass accepted updates to `handle_update`.
#[async_trait]
pub trait Handler: Send {
    fn name(&self) -> &str;

    fn check_update(&self, update: &CommonUpdate) -> bool;

    async fn handle_update(&mut self, update: &CommonUpdate) -> eyre::Result<()>;
}
