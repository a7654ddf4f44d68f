pub mod dispatcher;
pub mod errors;
pub mod event;
pub mod ports;
pub mod service;
