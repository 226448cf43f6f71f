use crate::archive::bounds::ArchiveBounds;
use crate::archive::range::{day_start, next_month, prev_month};
use crate::archive::ArchiveError;
use crate::urls::UrlBuilder;
use chrono::{DateTime, Datelike, Locale, NaiveDate, Utc};

/// 归档页的上一页/下一页
///
/// 某个方向不可用时 url 为空串，文字仍取当前单位自身的标签，
/// 模板因此总有内容可渲染。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub previous_text: String,
    pub previous_url: String,
    pub next_text: String,
    pub next_url: String,
}

impl Pager {
    /// 按请求粒度（日 > 月 > 年）计算翻页
    pub fn build(
        bounds: &ArchiveBounds,
        urls: &UrlBuilder,
        locale: Locale,
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Self, ArchiveError> {
        match (month, day) {
            (Some(month), Some(day)) => day_pager(bounds, urls, locale, year, month, day, now),
            (Some(month), None) => month_pager(bounds, urls, locale, year, month, now),
            (None, _) => Ok(year_pager(bounds, urls, year, now)),
        }
    }
}

fn year_pager(bounds: &ArchiveBounds, urls: &UrlBuilder, year: i32, now: DateTime<Utc>) -> Pager {
    let (previous_text, previous_url) = if bounds.first_year() <= year - 1 {
        ((year - 1).to_string(), urls.year_url(year - 1))
    } else {
        (year.to_string(), String::new())
    };

    let (next_text, next_url) = if year < now.year() {
        ((year + 1).to_string(), urls.year_url(year + 1))
    } else {
        (year.to_string(), String::new())
    };

    Pager {
        previous_text,
        previous_url,
        next_text,
        next_url,
    }
}

fn month_pager(
    bounds: &ArchiveBounds,
    urls: &UrlBuilder,
    locale: Locale,
    year: i32,
    month: u32,
    now: DateTime<Utc>,
) -> Result<Pager, ArchiveError> {
    let current = first_of_month(year, month)?;

    // 上一月：严格早于当前月 1 日零点才存在
    let (previous_text, previous_url) = if bounds.first_date() < day_start(current) {
        let (prev_year, prev_month) = prev_month(year, month);
        let previous = first_of_month(prev_year, prev_month)?;
        (month_label(previous, locale), urls.month_url(prev_year, prev_month))
    } else {
        (month_label(current, locale), String::new())
    };

    // 下一月：保留原有的按年/月数字分别比较的写法，不换成时间戳比较
    let (next_text, next_url) = if year < now.year() || month < now.month() {
        let (next_year, next_mon) = next_month(year, month);
        let next = first_of_month(next_year, next_mon)?;
        (month_label(next, locale), urls.month_url(next_year, next_mon))
    } else {
        (month_label(current, locale), String::new())
    };

    Ok(Pager {
        previous_text,
        previous_url,
        next_text,
        next_url,
    })
}

fn day_pager(
    bounds: &ArchiveBounds,
    urls: &UrlBuilder,
    locale: Locale,
    year: i32,
    month: u32,
    day: u32,
    now: DateTime<Utc>,
) -> Result<Pager, ArchiveError> {
    let current = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        tracing::debug!("无效日期：{year}-{month}-{day}");
        ArchiveError::NotFound
    })?;
    let current_start = day_start(current);
    let today_start = day_start(now.date_naive());

    // 上一日：真实的日历减法，1 日的前一天是上个月最后一天
    let (previous_text, previous_url) = match current.pred_opt() {
        Some(previous) if bounds.first_date() < current_start => (
            day_label(previous, locale),
            urls.day_url(previous.year(), previous.month(), previous.day()),
        ),
        _ => (day_label(current, locale), String::new()),
    };

    // 下一日：与“今天”的日界比较（月粒度用的是数字比较，两者刻意不统一）
    let (next_text, next_url) = match current.succ_opt() {
        Some(next) if current_start < today_start => (
            day_label(next, locale),
            urls.day_url(next.year(), next.month(), next.day()),
        ),
        _ => (day_label(current, locale), String::new()),
    };

    Ok(Pager {
        previous_text,
        previous_url,
        next_text,
        next_url,
    })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, ArchiveError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        tracing::debug!("无效月份：{year}-{month}");
        ArchiveError::NotFound
    })
}

/// 本地化月份名 + 年，如 "April, 2017"
fn month_label(date: NaiveDate, locale: Locale) -> String {
    format!("{}, {}", date.format_localized("%B", locale), date.year())
}

/// 补零日 + 本地化月份名 + 年，如 "01 April, 2017"
fn day_label(date: NaiveDate, locale: Locale) -> String {
    format!("{}, {}", date.format_localized("%d %B", locale), date.year())
}
