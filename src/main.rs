use clap::Parser;
use fabric_aggregator::adapters::http::{self, AppState};
use fabric_aggregator::core::{ConfigProvider, ZonePolicy};
use fabric_aggregator::utils::error::{AggregatorError, ErrorSeverity};
use fabric_aggregator::utils::{logger, validation::Validate};
use fabric_aggregator::{CliConfig, DispatchPipeline, NatsPublisher, Result, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 解析配置 (預設值 < 設定檔 < 環境變數/參數)
    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    tracing::info!("Starting fabric-aggregator");
    if settings.verbose {
        tracing::debug!("Resolved settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    if let Err(e) = run(settings).await {
        fail(&e);
    }

    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    let publisher =
        NatsPublisher::connect(settings.nats_url()).await?.with_flush(settings.flush_on_publish);

    if settings.zone_policy() == ZonePolicy::Verbatim {
        tracing::warn!(
            "⚠️ Zone policy is verbatim: fabric zones are spliced into bus subjects unchecked"
        );
    }

    let pipeline = DispatchPipeline::new(Arc::new(publisher.clone()))
        .with_zone_policy(settings.zone_policy());
    let state = AppState::new(Arc::new(pipeline), settings.dispatch_timeout());

    let listener = TcpListener::bind(settings.listen_addr()).await?;
    http::serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Shutting down Fabric Aggregator...");
    if let Err(e) = publisher.flush().await {
        tracing::warn!("Final broker flush failed: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Received shutdown signal");
}

fn fail(e: &AggregatorError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ fabric-aggregator failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(exit_code(e));
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &AggregatorError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}
