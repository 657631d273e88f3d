use clap::Parser;
use school_admin::utils::error::{ErrorSeverity, SchoolError};
use school_admin::utils::{logger, validation::Validate};
use school_admin::{app::console, AppConfig, AppContext, CliArgs};

fn exit_with(e: &SchoolError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    args.apply(&mut config);

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(&config.logging.level, config.logging.verbose);
    } else {
        logger::init_cli_logger(&config.logging.level, config.logging.verbose);
    }

    tracing::info!("Starting school-admin");
    tracing::debug!("CLI args: {:?}", args);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let mut ctx = AppContext::bootstrap(config).await;
    tracing::info!("Using {} record store", ctx.store().backend_name());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    if let Err(e) = console::run(&mut ctx, stdin, &mut stdout).await {
        tracing::error!(
            "❌ Console stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}
