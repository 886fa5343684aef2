pub mod command;
pub mod filter;
pub mod handler;
pub mod handlers;
