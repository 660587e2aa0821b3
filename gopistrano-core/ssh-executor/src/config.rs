//! SSH 配置

use std::path::{Path, PathBuf};

use crate::error::{Result, SshError};

/// SSH 认证方式
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// 密码认证
    Password(String),
    /// 私钥文件认证
    Key {
        /// 私钥路径
        key_path: PathBuf,
    },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::Key { key_path } => f.debug_struct("Key").field("key_path", key_path).finish(),
        }
    }
}

impl AuthMethod {
    /// 从配置中的原始值选出认证方式
    ///
    /// 空字符串视为未设置；两者都存在时密码优先。
    pub fn resolve(password: Option<&str>, private_key: Option<&str>) -> Option<Self> {
        let password = password.filter(|p| !p.is_empty());
        let private_key = private_key.filter(|k| !k.is_empty());

        match (password, private_key) {
            (Some(password), _) => Some(AuthMethod::Password(password.to_string())),
            (None, Some(key)) => Some(AuthMethod::Key {
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
        }
    }
}

/// 远程目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 主机地址
    pub host: String,
    /// 端口（默认 22）
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// 获取 SSH 地址字符串（host:port 格式）
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SSH 配置
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// 远程目标
    pub target: Target,
    /// 用户名
    pub username: String,
    /// 认证方式
    pub auth: AuthMethod,
    /// known_hosts 文件；未设置时接受任意主机密钥
    pub known_hosts: Option<PathBuf>,
}

impl SshConfig {
    /// 使用密码认证创建配置
    ///
    /// # Arguments
    /// * `host` - 主机地址
    /// * `username` - 用户名
    /// * `password` - 密码
    pub fn with_password(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            target: Target::new(host, 22),
            username: username.into(),
            auth: AuthMethod::Password(password.into()),
            known_hosts: None,
        }
    }

    /// 使用私钥认证创建配置
    ///
    /// # Arguments
    /// * `host` - 主机地址
    /// * `username` - 用户名
    /// * `key_path` - 私钥路径
    pub fn with_key(host: impl Into<String>, username: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::new(host, 22),
            username: username.into(),
            auth: AuthMethod::Key {
                key_path: key_path.into(),
            },
            known_hosts: None,
        }
    }

    /// 从配置文件的原始字段构建
    ///
    /// 用户名为空或密码、私钥都未提供时返回 [`SshError::NoCredentials`]，
    /// 此时不会发生任何网络连接。
    pub fn from_credentials(
        target: Target,
        username: &str,
        password: Option<&str>,
        private_key: Option<&str>,
    ) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(SshError::NoCredentials);
        }

        let auth = AuthMethod::resolve(password, private_key).ok_or(SshError::NoCredentials)?;

        Ok(Self {
            target,
            username: username.to_string(),
            auth,
            known_hosts: None,
        })
    }

    /// 设置端口
    pub fn port(mut self, port: u16) -> Self {
        self.target.port = port;
        self
    }

    /// 设置 known_hosts 文件
    pub fn known_hosts(mut self, path: Option<PathBuf>) -> Self {
        self.known_hosts = path;
        self
    }

    /// 获取 SSH 地址字符串（host:port 格式）
    pub fn address(&self) -> String {
        self.target.address()
    }
}

/// 展开路径（处理 ~ 等）
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return PathBuf::from(format!("{}{}", home.to_string_lossy(), rest));
            }
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_config() {
        let config = SshConfig::with_password("192.168.1.100", "deploy", "password123");
        assert_eq!(config.target.host, "192.168.1.100");
        assert_eq!(config.target.port, 22);
        assert_eq!(config.username, "deploy");
        assert!(matches!(config.auth, AuthMethod::Password(_)));
    }

    #[test]
    fn test_key_config() {
        let config = SshConfig::with_key("192.168.1.100", "deploy", "/home/user/.ssh/id_ed25519").port(2222);
        assert!(matches!(config.auth, AuthMethod::Key { .. }));
        assert_eq!(config.address(), "192.168.1.100:2222");
    }

    #[test]
    fn test_password_wins_over_key() {
        let auth = AuthMethod::resolve(Some("secret"), Some("/tmp/id_rsa")).unwrap();
        assert_eq!(auth, AuthMethod::Password("secret".to_string()));
    }

    #[test]
    fn test_empty_password_falls_back_to_key() {
        let auth = AuthMethod::resolve(Some(""), Some("/tmp/id_rsa")).unwrap();
        assert_eq!(
            auth,
            AuthMethod::Key {
                key_path: PathBuf::from("/tmp/id_rsa")
            }
        );
    }

    #[test]
    fn test_no_credentials() {
        let target = Target::new("example.com", 22);

        let err = SshConfig::from_credentials(target.clone(), "deploy", None, Some("")).unwrap_err();
        assert!(matches!(err, SshError::NoCredentials));

        let err = SshConfig::from_credentials(target, "", Some("secret"), None).unwrap_err();
        assert!(matches!(err, SshError::NoCredentials));
    }

    #[test]
    fn test_debug_redacts_password() {
        let auth = AuthMethod::Password("hunter2".to_string());
        assert!(!format!("{auth:?}").contains("hunter2"));
    }

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("/etc/hosts");
        assert_eq!(expand_path(&path), path);

        let home_relative = expand_path(Path::new("~/.ssh/id_rsa"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(home_relative, home.join(".ssh/id_rsa"));
        }

        // ~user 形式不展开
        assert_eq!(expand_path(Path::new("~other/key")), PathBuf::from("~other/key"));
    }
}
