//! CLI 命令处理模块

use std::fmt;
use std::str::FromStr;

pub mod deploy;

/// 部署动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// deploy:setup
    Setup,
    /// deploy
    Deploy,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deploy:setup" => Ok(Action::Setup),
            "deploy" => Ok(Action::Deploy),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Setup => f.write_str("deploy:setup"),
            Action::Deploy => f.write_str("deploy"),
        }
    }
}
