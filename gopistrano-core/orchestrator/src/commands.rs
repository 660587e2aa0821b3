//! 远程命令拼装
//!
//! 每个函数只生成一条 shell 命令字符串，不做任何 IO。

use crate::paths::DeployPaths;

/// 按 POSIX shell 规则引用参数
///
/// 只含安全字符的参数原样输出，否则用单引号包裹。
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-'));

    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// 创建 releases/shared/utils 并设置组可写
///
/// 用 `&&` 串联，任一步失败整条命令失败。
pub fn setup_layout(paths: &DeployPaths) -> String {
    let releases = shell_quote(paths.releases());
    let shared = shell_quote(paths.shared());
    let utils = shell_quote(paths.utils());
    let root = shell_quote(paths.root());

    format!(
        "if [ ! -d {releases} ]; then mkdir {releases}; fi && \
         if [ ! -d {shared} ]; then mkdir {shared}; fi && \
         if [ ! -d {utils} ]; then mkdir {utils}; fi && \
         chmod g+w {releases} {shared} {root} {utils}"
    )
}

/// 把脚本原样写入 utils/deploy.sh 并加可执行权限
pub fn install_script(paths: &DeployPaths, script: &str) -> String {
    let target = shell_quote(&paths.deploy_script());
    format!(
        "printf '%s' {} > {target} && chmod +x {target}",
        shell_quote(script)
    )
}

/// 检查目录布局后调用 deploy.sh
///
/// 任一前置检查失败都以状态 1 退出，与脚本自身失败无法区分。
pub fn run_deploy(paths: &DeployPaths, repository: &str, keep_releases: u32) -> String {
    let script = shell_quote(&paths.deploy_script());

    format!(
        "if [ ! -d {releases} ]; then exit 1; fi && \
         if [ ! -d {shared} ]; then exit 1; fi && \
         if [ ! -d {utils} ]; then exit 1; fi && \
         if [ ! -f {script} ]; then exit 1; fi && \
         {script} {root} {repository} {keep_releases}",
        releases = shell_quote(paths.releases()),
        shared = shell_quote(paths.shared()),
        utils = shell_quote(paths.utils()),
        root = shell_quote(paths.root()),
        repository = shell_quote(repository),
    )
}
