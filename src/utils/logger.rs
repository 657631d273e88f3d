use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 未設定時使用的過濾規則
fn default_directive(level: &str, verbose: bool) -> String {
    if verbose {
        "school_admin=debug,info".to_string()
    } else {
        format!("school_admin={}", level.to_ascii_lowercase())
    }
}

fn default_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level, verbose)))
}

pub fn init_cli_logger(level: &str, verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// JSON 格式輸出，方便部署環境收集日誌
pub fn init_json_logger(level: &str, verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_level_and_verbose() {
        assert_eq!(default_directive("info", false), "school_admin=info");
        assert_eq!(default_directive("WARN", false), "school_admin=warn");
        assert_eq!(default_directive("error", true), "school_admin=debug,info");
    }
}
