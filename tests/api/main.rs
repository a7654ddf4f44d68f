mod health_check;
mod helpers;
mod mailchimp_client;
mod webhook;
