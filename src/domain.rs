pub mod mailchimp;
pub mod webhook;
