use crate::archive::{ArchiveError, DateRange};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// 把 (year, month?, day?) 请求换算为半开区间 [start, end)
///
/// 时区约定：全部使用 UTC，“日界”即 UTC 零点。month/day 的进位
/// （12 月→次年 1 月、月末→次月 1 日、闰年）交给 chrono 的日历运算。
/// 只给日不给月时忽略日参数（按年归档处理）。
pub fn compute(year: i32, month: Option<u32>, day: Option<u32>) -> Result<DateRange, ArchiveError> {
    match (month, day) {
        (Some(month), Some(day)) => day_range(year, month, day),
        (Some(month), None) => month_range(year, month),
        (None, _) => year_range(year),
    }
}

fn year_range(year: i32) -> Result<DateRange, ArchiveError> {
    let start = ymd(year, 1, 1)?;
    let end = ymd(year + 1, 1, 1)?;
    Ok(DateRange {
        start: day_start(start),
        end: day_start(end),
    })
}

fn month_range(year: i32, month: u32) -> Result<DateRange, ArchiveError> {
    let start = ymd(year, month, 1)?;
    let (next_year, next_month) = next_month(year, month);
    let end = ymd(next_year, next_month, 1)?;
    Ok(DateRange {
        start: day_start(start),
        end: day_start(end),
    })
}

fn day_range(year: i32, month: u32, day: u32) -> Result<DateRange, ArchiveError> {
    let start = ymd(year, month, day)?;
    let end = start.succ_opt().ok_or(ArchiveError::NotFound)?;
    Ok(DateRange {
        start: day_start(start),
        end: day_start(end),
    })
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, ArchiveError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        tracing::debug!("无效日期：{year}-{month}-{day}");
        ArchiveError::NotFound
    })
}

pub(crate) fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

pub(crate) fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}
