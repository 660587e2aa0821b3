//! 部署编排
//!
//! `setup` 与 `deploy` 都是固定顺序的命令序列，任何一步失败立即中止，
//! 错误原样返回，已完成的远程步骤不会回滚。

use gopistrano_ssh_executor::{CommandRunner, Result};
use tracing::info;

use crate::commands;
use crate::paths::DeployPaths;
use crate::script::DEPLOY_SCRIPT;

/// 部署参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    /// 远程目录布局
    pub paths: DeployPaths,
    /// 代码仓库地址
    pub repository: String,
    /// 保留的发布版本数
    pub keep_releases: u32,
}

impl DeploySettings {
    pub fn new(path: impl AsRef<str>, repository: impl Into<String>, keep_releases: u32) -> Self {
        Self {
            paths: DeployPaths::new(path),
            repository: repository.into(),
            keep_releases,
        }
    }
}

/// 部署编排器
pub struct Deployer<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    settings: &'a DeploySettings,
}

impl<'a, R: CommandRunner + ?Sized> Deployer<'a, R> {
    pub fn new(runner: &'a R, settings: &'a DeploySettings) -> Self {
        Self { runner, settings }
    }

    /// 初始化目录布局并写入 deploy.sh
    ///
    /// 可重复执行：已有目录不会重建，脚本总是被覆盖。
    pub async fn setup(&self) -> Result<()> {
        let paths = &self.settings.paths;

        info!("初始化部署目录: {}", paths.root());
        self.runner.run(&commands::setup_layout(paths)).await?;

        info!("写入发布脚本: {}", paths.deploy_script());
        self.runner
            .run(&commands::install_script(paths, DEPLOY_SCRIPT))
            .await?;

        Ok(())
    }

    /// 调用 deploy.sh 发布新版本
    pub async fn deploy(&self) -> Result<()> {
        let settings = self.settings;

        info!(
            "发布 {} 到 {} (保留 {} 个版本)",
            settings.repository,
            settings.paths.releases(),
            settings.keep_releases
        );
        self.runner
            .run(&commands::run_deploy(
                &settings.paths,
                &settings.repository,
                settings.keep_releases,
            ))
            .await
    }
}
