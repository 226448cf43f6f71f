use slug::slugify;
use std::collections::HashSet;

/// 目标系统允许的 slug 长度范围
pub const MIN_LEN: usize = 3;
pub const MAX_LEN: usize = 64;
/// 超长 slug 截断到 61，给唯一化后缀留出空间
pub const TRUNCATED_LEN: usize = 61;

/// 把 slug 长度归一到 [MIN_LEN, MAX_LEN]
///
/// 过短时先尝试把标题转写成 slug；转写结果仍然太短就退回
/// 在原 slug 前加 "id-" 前缀。过长时截断。
pub fn normalize(slug_value: &str, title: &str) -> String {
    let length = slug_value.chars().count();

    if length < MIN_LEN {
        let transliterated = slugify(title);
        if transliterated.chars().count() >= MIN_LEN {
            tracing::info!("slug \"{slug_value}\" 过短，改用标题转写：{transliterated}");
            return transliterated;
        }
        return format!("id-{slug_value}");
    }

    if length > MAX_LEN {
        return slug_value.chars().take(TRUNCATED_LEN).collect();
    }

    slug_value.to_string()
}

/// 全量唯一化（后置阶段，需要完整行集）
///
/// 按行序处理：首次出现者保留原 slug，之后的冲突行依次尝试
/// -1、-2 … 直到不与已定下的 slug 冲突。后缀单调递增，必然收敛；
/// 同样的输入总产生同样的结果。
pub fn uniquify(rows: &mut [Vec<String>], link_col: usize) {
    let mut taken: HashSet<String> = HashSet::new();

    for row in rows.iter_mut() {
        let base = row[link_col].clone();
        let mut candidate = base.clone();
        let mut suffix = 0u32;

        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }

        if candidate != base {
            tracing::info!("slug 冲突：{base} → {candidate}");
            row[link_col] = candidate.clone();
        }
        taken.insert(candidate);
    }
}
