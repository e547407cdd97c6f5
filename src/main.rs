use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ledger_csv_import::args::parse();
    ledger_csv_import::cli::main(args).await
}
