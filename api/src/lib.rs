pub mod basic_types;
pub mod proto;
pub mod response;
pub mod sender;
