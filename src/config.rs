use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub archive: ArchiveParams,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// 归档页的 URL 参数名（对应路由 pattern 中的占位符）
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct ArchiveParams {
    #[serde(default = "default_year_param")]
    pub year_param: String,
    #[serde(default = "default_month_param")]
    pub month_param: String,
    #[serde(default = "default_day_param")]
    pub day_param: String,
    #[serde(default = "default_category_param")]
    pub category_param: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_post_url")]
    pub post_url: String,
    #[serde(default = "default_category_url")]
    pub category_url: String,
}

/// 导入预处理的默认开关，可被命令行选项覆盖
#[derive(Debug, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub files_path: String,
    #[serde(default)]
    pub external_domain: String,
    #[serde(default)]
    pub lightbox_to_magnific: bool,
    #[serde(default)]
    pub magnify_previews: bool,
    #[serde(default)]
    pub code_to_prettify: bool,
}

impl SiteConfig {
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join("blogarc.toml");
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("读取 blogarc.toml 失败：{}", e))?;
        let config: SiteConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("解析 blogarc.toml 失败：{}", e))?;
        Ok(config)
    }

    /// 配置文件不存在时回退到默认配置
    pub fn load_or_default(project_root: &Path) -> Self {
        if project_root.join("blogarc.toml").exists() {
            match Self::load(project_root) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{e}，使用默认配置"),
            }
        }
        Self::default()
    }
}

// 默认值函数
fn default_locale() -> String { "en_US".into() }
fn default_log_level() -> String { "info".into() }
fn default_db_path() -> String { "blog.db".into() }
fn default_year_param() -> String { "year".into() }
fn default_month_param() -> String { "month".into() }
fn default_day_param() -> String { "day".into() }
fn default_category_param() -> String { "category".into() }
fn default_archive_url() -> String { "/blog/archive/{year}/{month}/{day}".into() }
fn default_post_url() -> String { "/blog/post/{slug}".into() }
fn default_category_url() -> String { "/blog/category/{slug}".into() }

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            url: String::new(),
            locale: default_locale(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ArchiveParams {
    fn default() -> Self {
        Self {
            year_param: default_year_param(),
            month_param: default_month_param(),
            day_param: default_day_param(),
            category_param: default_category_param(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            post_url: default_post_url(),
            category_url: default_category_url(),
        }
    }
}
