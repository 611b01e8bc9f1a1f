use std::{env, io, io::prelude::*};

use filmgrid::config::{AppConfig, DEFAULT_ENDPOINT};

mod logging;

fn get_endpoint() -> String {
    match env::args().nth(1) {
        None => {
            print!("Movie collection URL [{}]: ", DEFAULT_ENDPOINT);
            if let Err(e) = io::stdout().flush() {
                log::warn!("Could not flush stdout: {}", e);
            }
            let mut user_input = String::new();
            if let Err(e) = io::stdin().read_line(&mut user_input) {
                log::warn!("Could not read collection URL, using default: {}", e);
            }
            match user_input.trim() {
                "" => DEFAULT_ENDPOINT.to_string(),
                endpoint => endpoint.to_string(),
            }
        }
        Some(endpoint) => endpoint,
    }
}

#[tokio::main]
async fn main() {
    logging::setup_logging();

    if let Err(e) = filmgrid::run(AppConfig::with_endpoint(get_endpoint())).await {
        log::error!("Could not start filmgrid: {}", e);
        std::process::exit(1);
    }
}
