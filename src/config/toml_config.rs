use crate::adapters::dom::ShellOptions;
use crate::core::engine::EngineOptions;
use crate::utils::error::{Result, RouterError};
use crate::utils::validation::{
    validate_attribute_name, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub server: ServerConfig,
    pub shell: ShellConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// No timeout unless set; a hung request keeps the page in its loading state.
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub mount_point_id: String,
    pub link_attribute: String,
    pub dynamic_css_attribute: String,
    pub error_heading: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let shell = ShellOptions::default();
        Self {
            mount_point_id: shell.mount_point_id,
            link_attribute: shell.link_attribute,
            dynamic_css_attribute: shell.dynamic_css_attribute,
            error_heading: EngineOptions::default().error_heading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub page_loaded: String,
    pub auth_hook: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            page_loaded: "page-loaded".to_string(),
            auth_hook: EngineOptions::default().auth_hook,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl RouterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RouterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RouterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BASE_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RouterError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.server.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            mount_point_id: self.shell.mount_point_id.clone(),
            link_attribute: self.shell.link_attribute.clone(),
            dynamic_css_attribute: self.shell.dynamic_css_attribute.clone(),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            auth_hook: self.events.auth_hook.clone(),
            error_heading: self.shell.error_heading.clone(),
        }
    }
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;

        if let Some(timeout) = self.server.request_timeout_seconds {
            validate_range("server.request_timeout_seconds", timeout, 1, 600)?;
        }

        validate_non_empty_string("shell.mount_point_id", &self.shell.mount_point_id)?;
        validate_attribute_name("shell.link_attribute", &self.shell.link_attribute)?;
        validate_attribute_name(
            "shell.dynamic_css_attribute",
            &self.shell.dynamic_css_attribute,
        )?;

        if self.shell.link_attribute == self.shell.dynamic_css_attribute {
            return Err(RouterError::InvalidConfigValueError {
                field: "shell.dynamic_css_attribute".to_string(),
                value: self.shell.dynamic_css_attribute.clone(),
                reason: "Must differ from shell.link_attribute".to_string(),
            });
        }

        validate_non_empty_string("events.page_loaded", &self.events.page_loaded)?;
        validate_non_empty_string("events.auth_hook", &self.events.auth_hook)?;

        Ok(())
    }
}
