//! Gopistrano 部署编排
//!
//! 在一个 SSH 会话上组合远程命令，实现两个动作：
//! - `setup`：创建 releases/shared/utils 目录并写入 `utils/deploy.sh`
//! - `deploy`：检查目录布局后调用 `deploy.sh` 发布新版本

pub mod commands;
mod deployer;
mod paths;
mod script;

pub use deployer::{DeploySettings, Deployer};
pub use paths::DeployPaths;
pub use script::DEPLOY_SCRIPT;
