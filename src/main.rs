use std::env;

use afford::api::ApiError;

#[tokio::main]
async fn main() {
    if let Err(e) = afford::telemetry::init() {
        eprintln!("Telemetry error: {e}");
        std::process::exit(1);
    }

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = afford::api::run_http_server(port).await {
            tracing::error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    match afford::api::run_cli(&raw_args) {
        Ok(report) => println!("{report}"),
        Err(ApiError::Args(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
