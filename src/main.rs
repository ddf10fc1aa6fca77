use clap::Parser;
use container_registry_client::cli::{Args, Runner};
use container_registry_client::logging;
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = Runner::new(args).run().await {
        eprintln!("Error: {}", e);
        if let Some(response) = e.response() {
            if response.has_body() {
                eprintln!("{}", response.body_text());
            }
        }
        process::exit(1);
    }
}
