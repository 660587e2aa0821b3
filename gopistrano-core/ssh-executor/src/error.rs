//! SSH 错误定义

use std::path::PathBuf;

use thiserror::Error;

/// SSH 操作结果类型
pub type Result<T> = std::result::Result<T, SshError>;

/// SSH 错误类型
#[derive(Error, Debug)]
pub enum SshError {
    /// 未配置可用的凭据（缺少用户名，或密码与私钥均为空）
    #[error("Unable to authenticate with server: no username with password or private key configured")]
    NoCredentials,

    /// 私钥文件无法读取
    #[error("unable to read private key {path:?}: {source}")]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 私钥内容无法解析
    #[error("unable to parse private key {path:?}: {message}")]
    KeyUnparseable { path: PathBuf, message: String },

    /// 连接、握手或认证失败
    #[error("{0}")]
    DialError(String),

    /// 远程命令执行失败
    #[error("{message}")]
    RemoteExecError {
        /// 远程退出码（命令未报告退出码时为 None）
        exit_status: Option<u32>,
        message: String,
    },

    /// russh 协议层错误
    #[error("ssh protocol error: {0}")]
    ProtocolError(#[from] russh::Error),

    /// 本地 IO 错误
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SshError {
    /// 远程命令以非零状态退出
    pub(crate) fn exit_status(command: &str, status: u32) -> Self {
        SshError::RemoteExecError {
            exit_status: Some(status),
            message: format!("Process exited with status {status} (command: {})", summarize(command)),
        }
    }

    /// 没有退出码的远程失败（信号、通道错误等）
    pub(crate) fn remote(message: impl Into<String>) -> Self {
        SshError::RemoteExecError {
            exit_status: None,
            message: message.into(),
        }
    }
}

/// 命令可能内嵌整段部署脚本，错误信息只保留首行
fn summarize(command: &str) -> String {
    const MAX: usize = 120;
    let first = command.lines().next().unwrap_or_default();
    if first.chars().count() > MAX || first.len() < command.len() {
        let cut: String = first.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}
