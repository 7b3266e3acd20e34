//! 命令列執行流程：載入配置、執行 ETL，並把結果轉成行程結束碼。

use crate::adapters::LocalStorage;
use crate::config::cli::CliConfig;
use crate::config::ResolvedConfig;
use crate::core::{etl::EtlEngine, pipeline::CsvPipeline};
use crate::utils::error::EtlError;

/// 成功 (含 dry run) 回傳 0，失敗回傳錯誤類別對應的結束碼
pub async fn run(args: &CliConfig) -> i32 {
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入並驗證配置，失敗時不碰任何資料檔
    let settings = match ResolvedConfig::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => return report_failure(&e),
    };

    println!("{}", settings.source.display());
    println!("{}", settings.destination.display());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No data files will be read or written");
        display_config_summary(&settings);
        return 0;
    }

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let run_span = tracing::info_span!("etl_run", config = %settings.config_path.display());
    let pipeline = CsvPipeline::new(LocalStorage::new(), settings);
    let mut engine = EtlEngine::new_with_monitoring(pipeline, args.monitor).with_span(run_span);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("📁 Output saved to: {}", summary.destination.display());
            if summary.rows_rejected > 0 {
                tracing::warn!("⚠️ {} records were quarantined", summary.rows_rejected);
            }
            0
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &EtlError) -> i32 {
    tracing::error!("❌ ETL process failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("   {}", e);
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    e.exit_code()
}

fn display_config_summary(settings: &ResolvedConfig) {
    println!("📋 Configuration Summary:");
    println!("  Config: {}", settings.config_path.display());
    println!("  Source: {}", settings.source.display());
    println!("  Destination: {}", settings.destination.display());
    println!("  Delimiter: {:?}", settings.delimiter as char);
    println!("  On transform error: {:?}", settings.row_error_policy);
    if let Some(quarantine) = &settings.quarantine {
        println!("  Quarantine: {}", quarantine.display());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Customer ID,Age,Date,Price per Unit,Total Amount,Gender
CUST0001,34,2024-01-05,9.99,9.99,Male
CUST0002,45,2024-01-06,4.50,9.00,Female
";

    fn args_for(config_path: &Path, extra: &[&str]) -> CliConfig {
        let mut argv = vec!["retail-etl", "--config", config_path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        CliConfig::parse_from(argv)
    }

    fn setup(source: &str, config: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("raw.csv"), source).unwrap();
        std::fs::write(temp_dir.path().join("config.json"), config).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_successful_run_exits_zero() {
        let temp_dir = setup(
            SAMPLE,
            r#"{"source": "raw.csv", "destination": "processed.csv"}"#,
        );

        let code = run(&args_for(&temp_dir.path().join("config.json"), &[])).await;
        assert_eq!(code, 0);
        assert!(temp_dir.path().join("processed.csv").exists());
    }

    #[tokio::test]
    async fn test_dry_run_touches_no_data_files() {
        // 來源不存在也沒關係，dry run 不讀資料檔
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"source": "raw.csv", "destination": "processed.csv"}"#,
        )
        .unwrap();

        let code = run(&args_for(&config_path, &["--dry-run"])).await;
        assert_eq!(code, 0);
        assert!(!temp_dir.path().join("processed.csv").exists());
    }

    #[tokio::test]
    async fn test_dry_run_still_validates_config() {
        let temp_dir = setup(SAMPLE, r#"{"source": "raw.csv"}"#);

        let code = run(&args_for(&temp_dir.path().join("config.json"), &["--dry-run"])).await;
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_failures_map_to_exit_codes() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            run(&args_for(&temp_dir.path().join("absent.json"), &[])).await,
            2
        );

        let temp_dir = setup(
            SAMPLE,
            r#"{"source": "nowhere.csv", "destination": "processed.csv"}"#,
        );
        assert_eq!(
            run(&args_for(&temp_dir.path().join("config.json"), &[])).await,
            3
        );

        let temp_dir = setup(
            &SAMPLE.replace("CUST0002", "0002"),
            r#"{"source": "raw.csv", "destination": "processed.csv"}"#,
        );
        assert_eq!(
            run(&args_for(&temp_dir.path().join("config.json"), &[])).await,
            4
        );

        let temp_dir = setup(
            SAMPLE,
            r#"{"source": "raw.csv", "destination": "missing/processed.csv"}"#,
        );
        assert_eq!(
            run(&args_for(&temp_dir.path().join("config.json"), &[])).await,
            5
        );
    }
}
