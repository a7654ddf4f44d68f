pub mod mailchimp;
pub mod storage;
pub mod telemetry;
