mod command;
mod message;

pub use command::CommandHandler;
pub use message::MessageHandler;
