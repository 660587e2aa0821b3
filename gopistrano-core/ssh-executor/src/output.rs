//! 远程输出回显
//!
//! 通道消息按到达顺序写入本地 stdout/stderr，每个数据块写完立即 flush。

use russh::ChannelMsg;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Result, SshError};

/// SSH_EXTENDED_DATA_STDERR
const EXTENDED_DATA_STDERR: u32 = 1;

/// 与回显相关的通道事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    ExitStatus(u32),
    ExitSignal { signal: String, message: String },
}

impl ChannelEvent {
    /// 转换 russh 通道消息，忽略与回显无关的消息
    pub fn from_msg(msg: ChannelMsg) -> Option<Self> {
        match msg {
            ChannelMsg::Data { data } => Some(ChannelEvent::Stdout(data.to_vec())),
            ChannelMsg::ExtendedData { data, ext } if ext == EXTENDED_DATA_STDERR => {
                Some(ChannelEvent::Stderr(data.to_vec()))
            }
            ChannelMsg::ExitStatus { exit_status } => Some(ChannelEvent::ExitStatus(exit_status)),
            ChannelMsg::ExitSignal {
                signal_name,
                error_message,
                ..
            } => Some(ChannelEvent::ExitSignal {
                signal: format!("{signal_name:?}"),
                message: error_message,
            }),
            // Eof 可能先于最后的数据到达，也可能根本不发送，读到通道关闭为止
            _ => None,
        }
    }
}

/// 把通道输出镜像到本地的两个流
pub struct OutputMirror<O, E> {
    stdout: O,
    stderr: E,
    exit_status: Option<u32>,
    exit_signal: Option<(String, String)>,
}

impl<O, E> OutputMirror<O, E>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    pub fn new(stdout: O, stderr: E) -> Self {
        Self {
            stdout,
            stderr,
            exit_status: None,
            exit_signal: None,
        }
    }

    /// 处理一个通道事件
    pub async fn handle(&mut self, event: ChannelEvent) -> Result<()> {
        match event {
            ChannelEvent::Stdout(data) => {
                trace!("stdout: {} 字节", data.len());
                self.stdout.write_all(&data).await?;
                self.stdout.flush().await?;
            }
            ChannelEvent::Stderr(data) => {
                trace!("stderr: {} 字节", data.len());
                self.stderr.write_all(&data).await?;
                self.stderr.flush().await?;
            }
            // 退出码可能先于剩余数据到达，不能据此结束读取
            ChannelEvent::ExitStatus(status) => self.exit_status = Some(status),
            ChannelEvent::ExitSignal { signal, message } => self.exit_signal = Some((signal, message)),
        }
        Ok(())
    }

    /// 通道读完后根据退出信息得出结果
    pub fn result(&self, command: &str) -> Result<()> {
        match (self.exit_status, &self.exit_signal) {
            (Some(0), _) => Ok(()),
            (Some(status), _) => Err(SshError::exit_status(command, status)),
            (None, Some((signal, message))) if message.is_empty() => {
                Err(SshError::remote(format!("Process killed by signal {signal}")))
            }
            (None, Some((signal, message))) => {
                Err(SshError::remote(format!("Process killed by signal {signal}: {message}")))
            }
            (None, None) => Err(SshError::remote("wait: remote command exited without exit status or exit signal")),
        }
    }

    /// 取回两个输出流
    pub fn into_inner(self) -> (O, E) {
        (self.stdout, self.stderr)
    }
}
