//! 认证材料准备
//!
//! 在建立 TCP 连接之前完成：私钥读取或解析失败时不会发起任何网络连接。

use std::path::Path;
use std::sync::Arc;

use russh::client::Handle;
use russh::keys::{PrivateKey, PrivateKeyWithHashAlg};
use tracing::debug;

use crate::config::{expand_path, AuthMethod};
use crate::error::{Result, SshError};

/// 已准备好的认证材料
#[derive(Clone)]
pub enum PreparedAuth {
    Password(String),
    PublicKey(Arc<PrivateKey>),
}

impl std::fmt::Debug for PreparedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreparedAuth::Password(_) => f.write_str("Password(<redacted>)"),
            PreparedAuth::PublicKey(key) => write!(f, "PublicKey({})", key.algorithm()),
        }
    }
}

/// 根据认证方式准备认证材料
pub fn prepare_auth(auth: &AuthMethod) -> Result<PreparedAuth> {
    match auth {
        AuthMethod::Password(password) => Ok(PreparedAuth::Password(password.clone())),
        AuthMethod::Key { key_path } => {
            let key = load_private_key(key_path)?;
            Ok(PreparedAuth::PublicKey(Arc::new(key)))
        }
    }
}

/// 读取并解析私钥文件
///
/// 读取失败返回 [`SshError::KeyUnreadable`]，内容无法解析返回 [`SshError::KeyUnparseable`]。
pub fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let path = expand_path(path);
    debug!("加载私钥: {:?}", path);

    let buffer = std::fs::read(&path).map_err(|source| SshError::KeyUnreadable {
        path: path.clone(),
        source,
    })?;

    let text = std::str::from_utf8(&buffer).map_err(|e| SshError::KeyUnparseable {
        path: path.clone(),
        message: e.to_string(),
    })?;

    russh::keys::decode_secret_key(text, None).map_err(|e| SshError::KeyUnparseable {
        path,
        message: e.to_string(),
    })
}

/// 在已握手的连接上认证
///
/// 服务器拒绝认证视为连接失败。
pub(crate) async fn authenticate<H>(handle: &mut Handle<H>, username: &str, auth: PreparedAuth) -> Result<()>
where
    H: russh::client::Handler,
{
    let accepted = match auth {
        PreparedAuth::Password(password) => handle
            .authenticate_password(username, password)
            .await
            .map_err(|e| SshError::DialError(format!("ssh: password authentication failed: {e}")))?
            .success(),
        PreparedAuth::PublicKey(key) => {
            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .map_err(|e| SshError::DialError(format!("ssh: unable to negotiate key hash: {e}")))?
                .flatten();
            handle
                .authenticate_publickey(username, PrivateKeyWithHashAlg::new(key, hash_alg))
                .await
                .map_err(|e| SshError::DialError(format!("ssh: public key authentication failed: {e}")))?
                .success()
        }
    };

    if !accepted {
        return Err(SshError::DialError(format!(
            "ssh: unable to authenticate as {username}, no supported methods remain"
        )));
    }

    Ok(())
}
