use std::process::ExitCode;

use garmin_progress::notifier_handler;

#[tokio::main]
async fn main() -> ExitCode {
    let outcome = notifier_handler().await;

    match serde_json::to_string(&outcome) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{:?}", outcome),
    }

    outcome.exit_code()
}
