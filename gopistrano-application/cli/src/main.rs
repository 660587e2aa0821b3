//! Gopistrano CLI 应用

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, Level};

mod commands;
mod gopfile;

use commands::Action;
use gopfile::GopfileConfig;

#[derive(Parser)]
#[command(name = "gopistrano")]
#[command(about = "Gopistrano - 基于 SSH 的极简部署工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// 配置文件路径
    #[arg(short, long, default_value = gopfile::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// 部署动作: deploy 或 deploy:setup（不区分大小写）
    action: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志，写到 stderr，不与远程 stdout 混在一起
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    debug!("加载配置: {:?}", cli.config);
    let config = match GopfileConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let action = match cli.action.as_deref().map(str::trim) {
        None | Some("") => {
            println!("Error: use gopistrano deploy or gopistrano deploy:setup");
            return ExitCode::SUCCESS;
        }
        Some(raw) => match raw.parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                println!("Invalid command!");
                return ExitCode::SUCCESS;
            }
        },
    };

    match commands::deploy::handle(action, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
