//! Gopistrano SSH 执行器
//!
//! 提供部署所需的远程命令执行能力，支持：
//! - 密码认证
//! - 私钥文件认证
//! - 单连接上多次打开命令通道
//! - 远程 stdout/stderr 实时回显到本地
//!
//! # 示例
//!
//! ```ignore
//! use gopistrano_ssh_executor::{CommandRunner, SshConfig, SshSession};
//!
//! let config = SshConfig::with_key("192.168.1.100", "deploy", "~/.ssh/id_ed25519");
//! let session = SshSession::connect(&config).await?;
//! session.run("ls -la /srv/app").await?;
//! session.close().await;
//! ```

mod auth;
mod config;
mod error;
mod output;
mod runner;
mod session;

pub use auth::{load_private_key, prepare_auth, PreparedAuth};
pub use config::{AuthMethod, SshConfig, Target};
pub use error::{Result, SshError};
pub use output::{ChannelEvent, OutputMirror};
pub use runner::CommandRunner;
pub use session::{ClientHandler, SshSession};
