mod health_check;
mod webhook;

pub use health_check::health_check;
pub use webhook::{process_webhook, verify_webhook};
