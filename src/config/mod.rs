pub mod toml_config;

pub use toml_config::{LogFormat, RouterConfig};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fragment-router")]
#[command(about = "Drive the order service's single-page navigation without a browser")]
pub struct CliConfig {
    /// Routes to navigate to, in order
    pub routes: Vec<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Origin of the order service (overrides server.base_url)")]
    pub base_url: Option<String>,

    #[arg(long, default_value = "/", help = "Route whose full page serves as the shell")]
    pub start: String,

    #[arg(long, default_value = "0", help = "Go back this many history entries at the end")]
    pub back: usize,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print page snapshots as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> crate::utils::error::Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::from_file(path)?,
            None => RouterConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.server.request_timeout_seconds = Some(timeout);
        }
        if self.verbose {
            config.logging.verbose = true;
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliConfig::parse_from([
            "fragment-router",
            "--base-url",
            "http://127.0.0.1:9000",
            "--timeout",
            "5",
            "/orders_page",
            "/admin_page",
        ]);
        assert_eq!(cli.routes, vec!["/orders_page", "/admin_page"]);
        assert_eq!(cli.start, "/");

        let config = cli.resolve().unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_seconds, Some(5));
        assert!(!config.logging.verbose);
    }
}
