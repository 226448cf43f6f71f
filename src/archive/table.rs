use crate::archive::DateRange;
use crate::repository::{Category, PostRepository};
use crate::urls::UrlBuilder;
use chrono::{DateTime, Locale, Utc};

/// 归档表中的一行
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub url: String,
    /// 文章第一个分类的名称；无分类时为空串（不是错误）
    pub category: String,
    pub category_url: String,
}

#[derive(Debug)]
pub struct ArchiveGroup {
    pub month: String,
    pub entries: Vec<ArchiveEntry>,
}

/// 按月份名分组的归档表
///
/// 分组顺序是遍历顺序（发布时间降序），不是日历顺序——
/// 既有模板依赖这个顺序，保持原样。
#[derive(Debug, Default)]
pub struct ArchiveTable {
    groups: Vec<ArchiveGroup>,
}

impl ArchiveTable {
    fn push(&mut self, month: &str, entry: ArchiveEntry) {
        match self.groups.iter_mut().find(|g| g.month == month) {
            Some(group) => group.entries.push(entry),
            None => self.groups.push(ArchiveGroup {
                month: month.to_string(),
                entries: vec![entry],
            }),
        }
    }

    pub fn groups(&self) -> &[ArchiveGroup] {
        &self.groups
    }

    /// 月份分组数
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, month: &str) -> Option<&[ArchiveEntry]> {
        self.groups
            .iter()
            .find(|g| g.month == month)
            .map(|g| g.entries.as_slice())
    }
}

/// 取区间内的可见文章并按月份名分组
pub async fn assemble(
    posts: &PostRepository,
    urls: &UrlBuilder,
    range: DateRange,
    category: Option<&Category>,
    locale: Locale,
    now: DateTime<Utc>,
) -> ArchiveTable {
    let rows = posts
        .find_visible_in_range(range.start, range.end, category.map(|c| c.id.as_str()), now)
        .await;

    let mut table = ArchiveTable::default();
    for row in rows {
        let month = row.published_at.format_localized("%B", locale).to_string();

        let (category_name, category_url) = match posts.first_category_of(&row.id).await {
            Some(cat) => {
                let url = urls.category_url(&cat.slug);
                (cat.name, url)
            }
            None => (String::new(), String::new()),
        };

        table.push(
            &month,
            ArchiveEntry {
                published_at: row.published_at,
                title: row.title,
                url: urls.post_url(&row.slug),
                category: category_name,
                category_url,
            },
        );
    }

    table
}
