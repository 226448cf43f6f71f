use crate::import::html::HtmlRewriter;
use crate::import::{slug, Columns};

/// 逐行执行各阶段；返回该行是否因 slug 解析失败被标记
///
/// 解析失败只记录日志，slug 相关字段保持原值，其余阶段照常执行，
/// 整个批处理不中断。
pub fn process(row: &mut [String], columns: &Columns, rewriter: &HtmlRewriter, row_no: usize) -> bool {
    let label = row_label(row, columns, row_no);

    dedup_teaser(row, columns, &label);

    let flagged = match extract_slug(&row[columns.link]) {
        Some(slug_value) => {
            row[columns.link] = slug::normalize(&slug_value, &row[columns.title]);
            false
        }
        None => {
            tracing::warn!("行 {label}：link 字段缺少引号，无法解析 slug");
            true
        }
    };

    fix_categories(row, columns.categories);
    rewrite_html(row, columns, rewriter);

    flagged
}

/// teaser 与正文完全相同就清空（不需要单独的摘要）
fn dedup_teaser(row: &mut [String], columns: &Columns, label: &str) {
    if !row[columns.teaser].is_empty() && row[columns.content] == row[columns.teaser] {
        row[columns.teaser].clear();
        tracing::info!("行 {label}：teaser 与正文相同，已清空");
    }
}

/// D6 Views 导出的 link 字段是完整的 <a> 标签
///
/// slug 取第一对双引号之间的 href 值按 / 切分后的最后一段。
fn extract_slug(link: &str) -> Option<String> {
    let start = link.find('"')?;
    let rest = &link[start + 1..];
    let end = rest.find('"')?;
    let href = &rest[..end];
    let slug_value = href.rsplit('/').next().unwrap_or(href);
    Some(slug_value.to_string())
}

/// 分类字段：D6 的 ", " 分隔符换成 "|"；过短的分类名补 -tag 后缀
fn fix_categories(row: &mut [String], index: usize) {
    let field = row[index].replace(", ", "|");
    if field.is_empty() {
        row[index] = field;
        return;
    }

    row[index] = field
        .split('|')
        .map(|name| {
            if !name.is_empty() && name.chars().count() < slug::MIN_LEN {
                format!("{name}-tag")
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("|");
}

fn rewrite_html(row: &mut [String], columns: &Columns, rewriter: &HtmlRewriter) {
    if !rewriter.enabled() {
        return;
    }
    for index in [columns.content, columns.teaser] {
        if !row[index].is_empty() {
            row[index] = rewriter.apply(&row[index]);
        }
    }
}

fn row_label(row: &[String], columns: &Columns, row_no: usize) -> String {
    match columns.id.and_then(|index| row.get(index)) {
        Some(id) if !id.is_empty() => id.clone(),
        _ => format!("#{row_no}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportOptions;

    fn columns() -> Columns {
        // id, title, content, teaser, link, categories
        Columns {
            id: Some(0),
            title: 1,
            content: 2,
            teaser: 3,
            link: 4,
            categories: 5,
        }
    }

    fn row(values: [&str; 6]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn noop_rewriter() -> HtmlRewriter {
        HtmlRewriter::new(&ImportOptions::default())
    }

    #[test]
    fn full_row_passes_all_stages() {
        let mut data = row([
            "12",
            "First Post",
            "<p>正文</p>",
            "<p>正文</p>",
            r#"<a href="https://old.site/blog/first-post">First Post</a>"#,
            "php, db",
        ]);
        let flagged = process(&mut data, &columns(), &noop_rewriter(), 1);

        assert!(!flagged);
        assert_eq!(data[3], "", "重复的 teaser 被清空");
        assert_eq!(data[4], "first-post");
        assert_eq!(data[5], "php|db-tag");
    }

    #[test]
    fn teaser_is_kept_when_different() {
        let mut data = row(["1", "t", "正文", "摘要", r#"<a href="/a/b">x</a>"#, ""]);
        process(&mut data, &columns(), &noop_rewriter(), 1);
        assert_eq!(data[3], "摘要");
    }

    #[test]
    fn malformed_link_flags_row_but_other_stages_run() {
        let mut data = row(["1", "t", "正文", "正文", "no quotes here", "ab, cde"]);
        let flagged = process(&mut data, &columns(), &noop_rewriter(), 1);

        assert!(flagged);
        // slug 相关字段保持原值
        assert_eq!(data[4], "no quotes here");
        // 其余阶段照常执行
        assert_eq!(data[3], "");
        assert_eq!(data[5], "ab-tag|cde");
    }

    #[test]
    fn short_extracted_slug_is_normalized() {
        let mut data = row([
            "1",
            "Some Long Title",
            "c",
            "",
            r#"<a href="https://old.site/ab">x</a>"#,
            "",
        ]);
        process(&mut data, &columns(), &noop_rewriter(), 1);
        assert_eq!(data[4], "some-long-title");
    }

    #[test]
    fn category_names_shorter_than_three_get_suffix() {
        let mut data = row(["1", "t", "c", "", r#"<a href="/x/slug-ok">x</a>"#, "db, rust, go"]);
        process(&mut data, &columns(), &noop_rewriter(), 1);
        assert_eq!(data[5], "db-tag|rust|go-tag");
    }
}
