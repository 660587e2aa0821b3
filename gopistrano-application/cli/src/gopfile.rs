//! Gopfile 配置加载
//!
//! **数据格式**: INI 风格的 `key = value` 文件（默认 ./Gopfile）
//! **覆盖方式**: 环境变量 `GOPISTRANO_<KEY>`，例如 `GOPISTRANO_HOSTNAME`
//!
//! 值按原样读取：不处理反斜杠转义，也不去掉引号。

use std::path::{Path, PathBuf};

use config::{
    Config, ConfigError, Environment, File, FileStoredFormat, Format, Map, Value, ValueKind,
};
use gopistrano_orchestrator::DeploySettings;
use gopistrano_ssh_executor::{SshConfig, Target};
use ini::{Ini, ParseOption};
use serde::Deserialize;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "Gopfile";

/// Gopfile 文件格式
///
/// 与 `FileFormat::Ini` 相同的 INI 语法，但关闭转义和引号处理，
/// 以免 `p\ass` 之类的密码被改写。
#[derive(Debug, Clone, Copy)]
pub struct GopfileFormat;

impl Format for GopfileFormat {
    fn parse(
        &self,
        uri: Option<&String>,
        text: &str,
    ) -> Result<Map<String, Value>, Box<dyn std::error::Error + Send + Sync>> {
        let option = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, option)?;

        let mut root = Map::new();
        for (section, properties) in ini.iter() {
            let mut entries = Map::new();
            for (key, value) in properties.iter() {
                let value = Value::new(uri, ValueKind::String(value.to_string()));
                entries.insert(key.to_string(), value);
            }

            match section {
                Some(name) => {
                    root.insert(name.to_string(), Value::new(uri, ValueKind::Table(entries)));
                }
                None => root.extend(entries),
            }
        }

        Ok(root)
    }
}

impl FileStoredFormat for GopfileFormat {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["ini"]
    }
}

/// Gopfile 配置
///
/// 启动时构建一次，之后只读。
#[derive(Debug, Clone, Deserialize)]
pub struct GopfileConfig {
    /// SSH 用户名
    pub username: String,

    /// SSH 密码（与 private_key 二选一）
    #[serde(default)]
    pub password: Option<String>,

    /// 私钥路径（与 password 二选一）
    #[serde(default)]
    pub private_key: Option<String>,

    /// 主机地址
    pub hostname: String,

    /// SSH 端口
    pub port: u16,

    /// 代码仓库地址
    pub repository: String,

    /// 远程部署根目录
    pub path: String,

    /// 保留的发布版本数
    pub keep_releases: u32,

    /// known_hosts 文件，未设置时不校验主机密钥
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
}

impl GopfileConfig {
    /// 加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = path.to_string_lossy();
        let settings = Config::builder()
            .add_source(File::new(&source, GopfileFormat).required(true))
            .add_source(Environment::with_prefix("GOPISTRANO").try_parsing(true))
            .build()?;

        Self::from_settings(settings)
    }

    /// 从字符串加载配置（不读取环境变量）
    #[cfg(test)]
    pub fn from_content(content: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(content, GopfileFormat))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self, ConfigError> {
        let config: GopfileConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置合法性
    ///
    /// 凭据是否齐全不在这里检查，由 [`GopfileConfig::ssh_config`] 报告。
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("username", &self.username),
            ("hostname", &self.hostname),
            ("repository", &self.repository),
            ("path", &self.path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port must be between 1 and 65535".to_string()));
        }

        if self.keep_releases == 0 {
            return Err(ConfigError::Message("keep_releases must be at least 1".to_string()));
        }

        Ok(())
    }

    /// SSH 连接配置
    pub fn ssh_config(&self) -> gopistrano_ssh_executor::Result<SshConfig> {
        let config = SshConfig::from_credentials(
            Target::new(&self.hostname, self.port),
            &self.username,
            self.password.as_deref(),
            self.private_key.as_deref(),
        )?;

        Ok(config.known_hosts(self.known_hosts.clone()))
    }

    /// 部署参数
    pub fn deploy_settings(&self) -> DeploySettings {
        DeploySettings::new(&self.path, &self.repository, self.keep_releases)
    }
}
