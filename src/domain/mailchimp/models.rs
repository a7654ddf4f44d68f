pub mod config;
pub mod email;
pub mod list;
pub mod member;
