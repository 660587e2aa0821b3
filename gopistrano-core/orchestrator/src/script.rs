//! 随程序分发的发布脚本

/// `utils/deploy.sh` 的内容，`deploy:setup` 每次都会原样覆盖写入
pub const DEPLOY_SCRIPT: &str = include_str!("../assets/deploy.sh");
