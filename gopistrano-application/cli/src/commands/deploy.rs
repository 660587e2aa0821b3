//! deploy / deploy:setup 命令

use anyhow::{Context, Result};
use colored::Colorize;
use gopistrano_orchestrator::{DeploySettings, Deployer};
use gopistrano_ssh_executor::{AuthMethod, CommandRunner, SshSession};
use tracing::info;

use super::Action;
use crate::gopfile::GopfileConfig;

pub async fn handle(action: Action, config: &GopfileConfig) -> Result<()> {
    let ssh_config = config.ssh_config().context("Failed to start")?;

    match &ssh_config.auth {
        AuthMethod::Password(_) => println!("SSH-ing into {}", config.hostname),
        AuthMethod::Key { key_path } => println!(
            "SSH-ing into {} with private key {}",
            config.hostname,
            key_path.display()
        ),
    }

    let session = SshSession::connect(&ssh_config)
        .await
        .context("Failed to start")?;

    let settings = config.deploy_settings();
    let result = run(action, &session, &settings).await;

    // 无论动作成功与否都释放连接
    session.close().await;
    result
}

/// 在给定执行器上运行动作
async fn run<R: CommandRunner + ?Sized>(action: Action, runner: &R, settings: &DeploySettings) -> Result<()> {
    info!("执行动作: {}", action);
    let deployer = Deployer::new(runner, settings);

    match action {
        Action::Setup => {
            deployer.setup().await?;
            println!(
                "{}",
                "Cool Beans! Gopistrano created the structure correctly!".green().bold()
            );
        }
        Action::Deploy => {
            deployer.deploy().await?;
            println!("{}", "Project Deployed!".green().bold());
        }
    }

    Ok(())
}
