use chrono::Locale;

/// 将配置中的 locale 代码解析为 chrono 的 Locale
///
/// 接受 "ru_RU"、"ru-RU"、"ru_RU.UTF-8" 等写法；无法识别时回退 en_US。
/// locale 始终作为参数传递，不设置任何进程级状态。
pub fn parse(code: &str) -> Locale {
    let normalized = code
        .split('.')
        .next()
        .unwrap_or(code)
        .replace('-', "_");

    match Locale::try_from(normalized.as_str()) {
        Ok(locale) => locale,
        Err(_) => {
            tracing::warn!("无法识别的 locale：{code}，回退到 en_US");
            Locale::en_US
        }
    }
}
