pub mod html;
pub mod row;
pub mod slug;

use anyhow::{Context, Result};
use csv::StringRecord;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV 缺少必需列：{name}")]
    ColumnNotFound { name: String },
}

/// 预处理开关；字符串为空即关闭对应的改写
#[derive(Debug, Default, Clone)]
pub struct ImportOptions {
    /// 文件链接的新路径（如 /storage/app/old-files），为空则不改写
    pub file_links: String,
    /// 指向本站的绝对链接要剥离的域名，为空则不改写
    pub external_domain: String,
    pub lightbox_to_magnific: bool,
    pub magnify_previews: bool,
    pub code_to_prettify: bool,
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub rows: usize,
    /// slug 解析失败的行数
    pub flagged: usize,
}

/// 按列名定位各列（大小写不敏感、忽略首尾空白，列序不固定）
#[derive(Debug)]
pub struct Columns {
    pub id: Option<usize>,
    pub title: usize,
    pub content: usize,
    pub teaser: usize,
    pub link: usize,
    pub categories: usize,
}

impl Columns {
    pub fn resolve(header: &StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|title| title.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                tracing::error!("找不到列 {name}");
                ImportError::ColumnNotFound {
                    name: name.to_string(),
                }
            })
        };

        Ok(Self {
            id: find("id"),
            title: required("title")?,
            content: required("content")?,
            teaser: required("teaser")?,
            link: required("link")?,
            categories: required("categories")?,
        })
    }
}

/// 预处理 Drupal 6 导出的 CSV：逐行管道 + 全量 slug 唯一化
///
/// 缺列中止整个批次；单行的解析失败只标记该行，批次继续。
pub fn run(input: &Path, output: &Path, options: &ImportOptions) -> Result<ImportStats> {
    tracing::info!("开始处理 {}", input.display());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("无法读取 {}", input.display()))?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => anyhow::bail!("CSV 文件为空"),
    };
    let columns = Columns::resolve(&header)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in records {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        // flexible 模式下短行补齐到表头宽度
        if row.len() < header.len() {
            row.resize(header.len(), String::new());
        }
        rows.push(row);
    }
    tracing::info!("解析完成，共 {} 行，开始逐行处理", rows.len());

    let rewriter = html::HtmlRewriter::new(options);
    let mut stats = ImportStats {
        rows: rows.len(),
        flagged: 0,
    };
    for (index, row) in rows.iter_mut().enumerate() {
        if row::process(row, &columns, &rewriter, index + 1) {
            stats.flagged += 1;
        }
    }

    // 唯一化需要看到处理完的整个行集，必须放在逐行管道之后
    slug::uniquify(&mut rows, columns.link);

    let mut writer =
        csv::Writer::from_path(output).with_context(|| format!("无法写入 {}", output.display()))?;
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    tracing::info!(
        "已写出 {}（{} 行，{} 行有解析问题）",
        output.display(),
        stats.rows,
        stats.flagged
    );
    Ok(stats)
}
