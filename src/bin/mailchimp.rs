use clap::Parser;
use mailchimp_integration::configuration::get_configuration;
use mailchimp_integration::inbound::cli::{build_client, report, run, CliArgs};
use mailchimp_integration::outbound::telemetry::init_logger;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let configuration = match get_configuration() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("Mailchimp configuration not found: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // Logs go to stderr, command output to stdout.
    init_logger("mailchimp", "warn", std::io::stderr);

    let client = match build_client(&configuration.mailchimp) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout();
    match run(&args, &client, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = report(&e, &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}
