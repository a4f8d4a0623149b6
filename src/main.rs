use clap::Parser;
use qa_ledger::adapter::inbound::cli::{self, command::Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(failure) = cli::run(cli).await {
        failure.print();
        std::process::exit(failure.exit_code());
    }
}
