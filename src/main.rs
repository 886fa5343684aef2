mod config;
mod inspector;

use crate::{config::GlobalConfig, inspector::Inspector};
use api::{
    proto::{CommonUpdate, Message, UpdateType},
    response::parse_updates,
};
use bot::{filter::SenderFilter, handler::Handler, handlers::MessageHandler};
use eyre::WrapErr;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::Path;

async fn run(
    handlers: &mut [&mut dyn Handler],
    updates: &[CommonUpdate],
    stop_on_error: bool,
) -> eyre::Result<()> {
    for update in updates {
        for handler in handlers.iter_mut() {
            if !handler.check_update(update) {
                continue;
            }
            if let Err(report) = handler.handle_update(update).await {
                if stop_on_error {
                    return Err(report.wrap_err(format!(
                        "'{}' failed on update {}",
                        handler.name(),
                        update.id
                    )));
                }
                error!("'{}' failed on update {}, {report}", handler.name(), update.id);
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let work_dir = dotenv::var("WORK_DIR").unwrap_or_else(|_| ".".into());
    let work_dir = Path::new(work_dir.as_str());

    let config = GlobalConfig::from_file(work_dir.join("config.xml"))
        .wrap_err("failed to load config")?;

    SimpleLogger::new()
        .with_level(LevelFilter::Off)
        .with_module_level("herald", config.level_filter()?)
        .with_module_level("bot", config.level_filter()?)
        .with_module_level("api", config.level_filter()?)
        .init()?;

    let path = work_dir.join(config.updates_file.as_str());
    let text = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read updates, path = {path:?}"))?;
    let updates = parse_updates(&text)?;
    info!("{} updates loaded from {path:?}", updates.len());

    let mut inspector = Inspector::new();
    let mut linked_posts = 0usize;
    let mut linked = MessageHandler::new("linked channel posts", |message: &Message| {
        linked_posts += 1;
        info!(
            "post {} forwarded from '{}' into chat {}",
            message.message_id,
            message.sender().name(),
            message.chat.id
        );
        Ok(())
    })
    .allow(UpdateType::EditedMessage)
    .with_filter(SenderFilter::LinkedChannel);

    let mut handlers: [&mut dyn Handler; 2] = [&mut inspector, &mut linked];
    run(&mut handlers, &updates, config.stop_on_error).await?;
    drop(linked);

    info!("{linked_posts} posts came from linked channels");
    for line in inspector.summary().lines() {
        info!("{line}");
    }
    Ok(())
}
