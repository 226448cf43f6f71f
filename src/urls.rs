use crate::config::SiteConfig;

/// 按路由 pattern 生成 URL
///
/// pattern 以 `{param}` 作为占位符，例如 `/blog/archive/{year}/{month}/{day}`。
/// 生成时逐段替换；遇到未提供值的占位符即截断（CMS 路由的可选参数语义），
/// 因此同一个 pattern 可以生成年、年月、年月日三种链接。
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    archive_pattern: String,
    post_pattern: String,
    category_pattern: String,
    year_param: String,
    month_param: String,
    day_param: String,
}

impl UrlBuilder {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            archive_pattern: config.routes.archive_url.clone(),
            post_pattern: config.routes.post_url.clone(),
            category_pattern: config.routes.category_url.clone(),
            year_param: config.archive.year_param.clone(),
            month_param: config.archive.month_param.clone(),
            day_param: config.archive.day_param.clone(),
        }
    }

    pub fn year_url(&self, year: i32) -> String {
        build(
            &self.archive_pattern,
            &[(self.year_param.as_str(), year.to_string())],
        )
    }

    pub fn month_url(&self, year: i32, month: u32) -> String {
        build(
            &self.archive_pattern,
            &[
                (self.year_param.as_str(), year.to_string()),
                (self.month_param.as_str(), month.to_string()),
            ],
        )
    }

    pub fn day_url(&self, year: i32, month: u32, day: u32) -> String {
        build(
            &self.archive_pattern,
            &[
                (self.year_param.as_str(), year.to_string()),
                (self.month_param.as_str(), month.to_string()),
                (self.day_param.as_str(), day.to_string()),
            ],
        )
    }

    pub fn post_url(&self, slug: &str) -> String {
        build(&self.post_pattern, &[("slug", slug.to_string())])
    }

    pub fn category_url(&self, slug: &str) -> String {
        build(&self.category_pattern, &[("slug", slug.to_string())])
    }

    /// 归档路由是否声明了年份参数（站点地图依赖该判断）
    pub fn has_year_param(&self) -> bool {
        has_param(&self.archive_pattern, &self.year_param)
    }
}

/// 逐段替换 pattern 中的占位符；未解析的占位符截断剩余部分
fn build(pattern: &str, params: &[(&str, String)]) -> String {
    let mut segments = Vec::new();

    for segment in pattern.split('/') {
        if let Some(name) = placeholder(segment) {
            match params.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => segments.push(value.clone()),
                None => break,
            }
        } else {
            segments.push(segment.to_string());
        }
    }

    let url = segments.join("/");
    if url.is_empty() { "/".to_string() } else { url }
}

pub fn has_param(pattern: &str, name: &str) -> bool {
    pattern
        .split('/')
        .any(|segment| placeholder(segment) == Some(name))
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
