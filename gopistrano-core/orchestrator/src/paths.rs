//! 远程目录布局

/// 部署目录布局
///
/// `releases`、`shared`、`utils` 始终由 `root` 派生，不能单独设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    root: String,
    releases: String,
    shared: String,
    utils: String,
}

impl DeployPaths {
    /// 根据部署根目录生成布局，去掉根目录末尾多余的 `/`
    pub fn new(root: impl AsRef<str>) -> Self {
        let raw = root.as_ref();
        let trimmed = raw.trim_end_matches('/');
        let root = if trimmed.is_empty() && raw.starts_with('/') {
            "/".to_string()
        } else {
            trimmed.to_string()
        };

        let base = root.trim_end_matches('/');
        Self {
            releases: format!("{base}/releases"),
            shared: format!("{base}/shared"),
            utils: format!("{base}/utils"),
            root,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn releases(&self) -> &str {
        &self.releases
    }

    pub fn shared(&self) -> &str {
        &self.shared
    }

    pub fn utils(&self) -> &str {
        &self.utils
    }

    /// `utils/deploy.sh`
    pub fn deploy_script(&self) -> String {
        format!("{}/deploy.sh", self.utils)
    }
}
