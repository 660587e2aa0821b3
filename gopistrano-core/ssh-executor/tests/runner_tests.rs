//! 命令执行测试
//!
//! 在本机 127.0.0.1 上启动一个进程内的 russh 服务端，按命令名回放
//! 固定的输出和退出码，验证真实通道上的执行与回显。

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gopistrano_ssh_executor::*;
use russh::server::{Auth, Msg, Server as _, Session};
use russh::{Channel, ChannelId, CryptoVec};
use tokio::net::TcpListener;

const HOST_KEY: &str = include_str!("fixtures/host_ed25519");

/// 测试服务端
#[derive(Clone, Default)]
struct ReplayServer {
    channels_opened: Arc<AtomicUsize>,
}

impl russh::server::Server for ReplayServer {
    type Handler = ReplayHandler;

    fn new_client(&mut self, _peer_addr: Option<SocketAddr>) -> Self::Handler {
        ReplayHandler {
            channels_opened: Arc::clone(&self.channels_opened),
        }
    }
}

struct ReplayHandler {
    channels_opened: Arc<AtomicUsize>,
}

impl russh::server::Handler for ReplayHandler {
    type Error = russh::Error;

    async fn auth_password(&mut self, _user: &str, password: &str) -> std::result::Result<Auth, Self::Error> {
        if password == "secret" {
            Ok(Auth::Accept)
        } else {
            Ok(Auth::Reject {
                proceed_with_methods: None,
                partial_success: false,
            })
        }
    }

    async fn auth_publickey(
        &mut self,
        _user: &str,
        _public_key: &russh::keys::PublicKey,
    ) -> std::result::Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        _channel: Channel<Msg>,
        _session: &mut Session,
    ) -> std::result::Result<bool, Self::Error> {
        self.channels_opened.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> std::result::Result<(), Self::Error> {
        let _ = session.channel_success(channel);

        let command = data.to_vec();
        let handle = session.handle();
        tokio::spawn(async move {
            match command.as_slice() {
                b"greet" => {
                    let _ = handle.data(channel, CryptoVec::from_slice(b"hello stdout\n")).await;
                    let _ = handle
                        .extended_data(channel, 1, CryptoVec::from_slice(b"hello stderr\n"))
                        .await;
                    let _ = handle.exit_status_request(channel, 0).await;
                }
                b"fail" => {
                    let _ = handle.data(channel, CryptoVec::from_slice(b"partial\n")).await;
                    let _ = handle
                        .extended_data(channel, 1, CryptoVec::from_slice(b"boom\n"))
                        .await;
                    let _ = handle.exit_status_request(channel, 3).await;
                }
                // 输出后直接关闭，不报告退出码
                b"vanish" => {
                    let _ = handle.data(channel, CryptoVec::from_slice(b"bye\n")).await;
                }
                _ => {
                    let _ = handle.exit_status_request(channel, 127).await;
                }
            }

            let _ = handle.eof(channel).await;
            let _ = handle.close(channel).await;
        });

        Ok(())
    }
}

/// 启动服务端，返回监听端口与通道计数
async fn start_server() -> (u16, Arc<AtomicUsize>) {
    let host_key = russh::keys::decode_secret_key(HOST_KEY, None).unwrap();
    let config = Arc::new(russh::server::Config {
        keys: vec![host_key],
        auth_rejection_time: Duration::from_millis(0),
        auth_rejection_time_initial: Some(Duration::from_millis(0)),
        ..Default::default()
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut server = ReplayServer::default();
    let channels_opened = Arc::clone(&server.channels_opened);
    tokio::spawn(async move {
        let _ = server.run_on_socket(config, &listener).await;
    });

    (port, channels_opened)
}

async fn connect(port: u16) -> SshSession {
    let config = SshConfig::with_password("127.0.0.1", "deploy", "secret").port(port);
    SshSession::connect(&config).await.unwrap()
}

async fn run(session: &SshSession, command: &str) -> (Vec<u8>, Vec<u8>, Result<()>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = session.run_with(command, &mut stdout, &mut stderr).await;
    (stdout, stderr, result)
}

#[tokio::test]
async fn test_success_mirrors_exact_bytes() {
    let (port, _) = start_server().await;
    let session = connect(port).await;

    let (stdout, stderr, result) = run(&session, "greet").await;

    assert!(result.is_ok(), "unexpected error: {:?}", result);
    assert_eq!(stdout, b"hello stdout\n");
    assert_eq!(stderr, b"hello stderr\n");

    session.close().await;
}

#[tokio::test]
async fn test_non_zero_exit_after_output() {
    let (port, _) = start_server().await;
    let session = connect(port).await;

    let (stdout, stderr, result) = run(&session, "fail").await;

    assert_eq!(stdout, b"partial\n");
    assert_eq!(stderr, b"boom\n");
    assert!(matches!(
        result,
        Err(SshError::RemoteExecError {
            exit_status: Some(3),
            ..
        })
    ));

    session.close().await;
}

#[tokio::test]
async fn test_close_without_exit_status_fails() {
    let (port, _) = start_server().await;
    let session = connect(port).await;

    let (stdout, _, result) = run(&session, "vanish").await;

    assert_eq!(stdout, b"bye\n");
    assert!(matches!(
        result,
        Err(SshError::RemoteExecError { exit_status: None, .. })
    ));

    session.close().await;
}

#[tokio::test]
async fn test_session_runs_several_commands() {
    let (port, channels_opened) = start_server().await;
    let session = connect(port).await;

    // 服务端已关闭通道，客户端关闭阶段的错误不影响结果
    for _ in 0..3 {
        let (_, _, result) = run(&session, "greet").await;
        assert!(result.is_ok(), "unexpected error: {:?}", result);
    }
    assert_eq!(channels_opened.load(Ordering::SeqCst), 3);

    session.close().await;
}

#[tokio::test]
async fn test_empty_command_opens_no_channel() {
    let (port, channels_opened) = start_server().await;
    let session = connect(port).await;

    let (stdout, stderr, result) = run(&session, "   ").await;

    assert!(matches!(
        result,
        Err(SshError::RemoteExecError { exit_status: None, .. })
    ));
    assert!(stdout.is_empty() && stderr.is_empty());
    assert_eq!(channels_opened.load(Ordering::SeqCst), 0);

    session.close().await;
}

#[tokio::test]
async fn test_rejected_password_is_dial_error() {
    let (port, _) = start_server().await;
    let config = SshConfig::with_password("127.0.0.1", "deploy", "wrong").port(port);

    let err = SshSession::connect(&config).await.err().unwrap();
    assert!(matches!(err, SshError::DialError(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_private_key_authentication() {
    let (port, _) = start_server().await;
    let key_path =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/host_ed25519");
    let config = SshConfig::with_key("127.0.0.1", "deploy", key_path).port(port);

    let session = SshSession::connect(&config).await.unwrap();
    let (stdout, _, result) = run(&session, "greet").await;

    assert!(result.is_ok(), "unexpected error: {:?}", result);
    assert_eq!(stdout, b"hello stdout\n");

    session.close().await;
}
