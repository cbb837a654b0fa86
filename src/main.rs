use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shiftrich::logging::init_logging();
    let cli = shiftrich::api::Cli::parse();
    shiftrich::api::run(cli).await
}
