//! 远程命令执行

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tracing::debug;

use crate::error::{Result, SshError};
use crate::output::{ChannelEvent, OutputMirror};
use crate::session::SshSession;

/// 执行一条 shell 命令，输出回显到本地
///
/// 调用会阻塞到远程命令结束且全部输出已回显。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<()>;
}

#[async_trait]
impl CommandRunner for SshSession {
    async fn run(&self, command: &str) -> Result<()> {
        self.run_with(command, &mut tokio::io::stdout(), &mut tokio::io::stderr())
            .await
    }
}

impl SshSession {
    /// 执行命令，远程 stdout/stderr 写入给定的两个流
    pub async fn run_with<O, E>(&self, command: &str, stdout: &mut O, stderr: &mut E) -> Result<()>
    where
        O: AsyncWrite + Unpin + Send + ?Sized,
        E: AsyncWrite + Unpin + Send + ?Sized,
    {
        if command.trim().is_empty() {
            return Err(SshError::remote("refusing to run an empty command"));
        }

        debug!("执行命令: {}", command);

        let mut channel = self.open_channel().await?;
        let mut mirror = OutputMirror::new(stdout, stderr);

        let drained = async {
            channel
                .exec(true, command)
                .await
                .map_err(|e| SshError::remote(format!("ssh: exec request failed: {e}")))?;

            while let Some(msg) = channel.wait().await {
                if let Some(event) = ChannelEvent::from_msg(msg) {
                    mirror.handle(event).await?;
                }
            }
            mirror.result(command)
        }
        .await;

        // 对端在输出结束后挂断时关闭通道会报错（通常是 EOF），
        // 这里只丢弃关闭阶段的错误，命令本身的结果照常返回
        if let Err(e) = channel.close().await {
            debug!("关闭通道时出错（忽略）: {}", e);
        }

        drained
    }
}
