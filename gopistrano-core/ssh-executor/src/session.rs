//! SSH 会话实现
//!
//! 一个会话对应一条已认证的 russh 连接，可以在其上反复打开命令通道。

use std::path::PathBuf;
use std::sync::Arc;

use russh::client::{self, Handle, Handler, Msg};
use russh::{Channel, Disconnect};
use tracing::{debug, info, warn};

use crate::auth::{authenticate, prepare_auth};
use crate::config::{expand_path, SshConfig, Target};
use crate::error::{Result, SshError};

/// 主机密钥校验
#[derive(Debug, Clone)]
pub struct ClientHandler {
    target: Target,
    known_hosts: Option<PathBuf>,
}

impl Handler for ClientHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let Some(known_hosts) = &self.known_hosts else {
            warn!(
                "未配置 known_hosts，接受 {} 的主机密钥 ({})",
                self.target.address(),
                server_public_key.algorithm()
            );
            return Ok(true);
        };

        let matched = russh::keys::check_known_hosts_path(
            &self.target.host,
            self.target.port,
            server_public_key,
            known_hosts,
        )
        .map_err(|e| SshError::DialError(format!("ssh: host key verification failed: {e}")))?;

        if !matched {
            warn!("{} 的主机密钥不在 {:?} 中", self.target.address(), known_hosts);
        }
        Ok(matched)
    }
}

/// SSH 会话
pub struct SshSession {
    handle: Handle<ClientHandler>,
    target: Target,
}

impl SshSession {
    /// 连接到 SSH 服务器并完成认证
    ///
    /// 认证材料先于连接准备，私钥错误不会触发网络连接。
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let auth = prepare_auth(&config.auth)?;

        info!("正在连接 SSH: {}@{}", config.username, config.address());

        let handler = ClientHandler {
            target: config.target.clone(),
            known_hosts: config.known_hosts.as_deref().map(expand_path),
        };

        let client_config = Arc::new(client::Config::default());
        let mut handle = client::connect(
            client_config,
            (config.target.host.as_str(), config.target.port),
            handler,
        )
        .await
        .map_err(|e| match e {
            SshError::DialError(message) => SshError::DialError(message),
            other => SshError::DialError(format!("dial tcp {}: {other}", config.address())),
        })?;

        authenticate(&mut handle, &config.username, auth).await?;

        info!("SSH 连接成功: {}@{}", config.username, config.address());
        Ok(Self {
            handle,
            target: config.target.clone(),
        })
    }

    /// 打开一个新的会话通道
    pub(crate) async fn open_channel(&self) -> Result<Channel<Msg>> {
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::remote(format!("ssh: unable to open channel: {e}")))
    }

    /// 关闭连接
    ///
    /// 断开失败只记录日志：此时所有命令都已结束。
    pub async fn close(self) {
        debug!("断开 SSH 连接: {}", self.target.address());
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            debug!("断开 SSH 连接时出错（忽略）: {}", e);
        }
    }
}
