use clap::Parser;
use retail_etl::utils::logger;
use retail_etl::{app, CliConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting retail-etl");
    tracing::debug!("CLI config: {:?}", args);

    match app::run(&args).await {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}
