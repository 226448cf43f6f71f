use crate::import::ImportOptions;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Drupal 6 的文件存储路径前缀
const OLD_FILES_PATH: &str = "/sites/default/files";

static FILE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<attr>href|src)="(?P<path>/sites/default/files[^"]*)""#).unwrap()
});
static A_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<a\b[^>]*>").unwrap());
static REL_LIGHTBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*rel="lightbox""#).unwrap());
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*class="[^"]*""#).unwrap());
static LINKED_IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(?P<anchor><a\b[^>]*>)\s*)?(?P<img><img\b[^>]*/?>)"#).unwrap()
});
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src="(?P<src>[^"]*)""#).unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br\s*/?>").unwrap());
static LANG_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"language="(?P<lang>[^"]+)""#).unwrap());
static EMPTY_P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p>\s*</p>").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{1}(?P<idx>[0-9]+)\u{1}").unwrap());

/// 正文/摘要的 HTML 改写管道
///
/// 解析、改写、序列化都作用在独占的 String 值上，每个开关对应
/// 一个独立的改写遍；全部关闭时 apply 原样返回。
pub struct HtmlRewriter {
    file_links: String,
    external: Option<Regex>,
    lightbox: bool,
    magnify: bool,
    code_blocks: Option<[Regex; 2]>,
}

impl HtmlRewriter {
    pub fn new(options: &ImportOptions) -> Self {
        let external = if options.external_domain.is_empty() {
            None
        } else {
            let pattern = format!(
                r#"(?P<attr>href|src)="https?://(?:www\.)?{}(?P<path>/[^"]*)?""#,
                regex::escape(&options.external_domain)
            );
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("外部域名正则编译失败：{e}");
                    None
                }
            }
        };

        // 遗留代码块标签各自一个模式（regex 不支持反向引用）
        let code_blocks = options.code_to_prettify.then(|| {
            ["blockcode", "code"].map(|tag| {
                Regex::new(&format!(r"(?s)<{tag}(?P<attrs>\s[^>]*)?>(?P<body>.*?)</{tag}>"))
                    .unwrap()
            })
        });

        Self {
            file_links: options.file_links.clone(),
            external,
            lightbox: options.lightbox_to_magnific,
            magnify: options.magnify_previews,
            code_blocks,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.file_links.is_empty()
            || self.external.is_some()
            || self.lightbox
            || self.magnify
            || self.code_blocks.is_some()
    }

    /// 依序执行启用的改写遍。先去域名再改文件路径，
    /// 这样站内绝对链接也能在同一轮被改写到新位置。
    pub fn apply(&self, html: &str) -> String {
        let mut html = html.to_string();

        if let Some(re) = &self.external {
            html = rewrite_external(re, &html);
        }
        if !self.file_links.is_empty() {
            html = rewrite_file_links(&html, &self.file_links);
        }
        if self.lightbox {
            html = lightbox_to_magnific(&html);
        }
        if self.magnify {
            html = magnify_previews(&html);
        }
        if let Some(patterns) = &self.code_blocks {
            html = code_to_prettify(&html, patterns);
        }

        html
    }
}

/// 指向本站域名的绝对链接改为根相对
fn rewrite_external(re: &Regex, html: &str) -> String {
    re.replace_all(html, |caps: &Captures| {
        let path = caps.name("path").map_or("/", |m| m.as_str());
        format!(r#"{}="{}""#, &caps["attr"], path)
    })
    .into_owned()
}

/// sites/default/files 前缀换成新的文件目录
fn rewrite_file_links(html: &str, new_path: &str) -> String {
    FILE_LINK_RE
        .replace_all(html, |caps: &Captures| {
            let tail = &caps["path"][OLD_FILES_PATH.len()..];
            tracing::debug!("重写文件链接：{}", &caps["path"]);
            format!(r#"{}="{}{}""#, &caps["attr"], new_path, tail)
        })
        .into_owned()
}

/// rel="lightbox" 换成 class="magnific"（原有 class 被覆盖）
fn lightbox_to_magnific(html: &str) -> String {
    A_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            if !REL_LIGHTBOX_RE.is_match(tag) {
                return tag.to_string();
            }
            let cleaned = REL_LIGHTBOX_RE.replace_all(tag, "");
            let cleaned = CLASS_ATTR_RE.replace_all(&cleaned, "");
            format!(r#"{} class="magnific">"#, &cleaned[..cleaned.len() - 1])
        })
        .into_owned()
}

/// 没有链接包裹的预览图补上放大链接，目标是去掉 .preview. 的原图
fn magnify_previews(html: &str) -> String {
    LINKED_IMG_RE
        .replace_all(html, |caps: &Captures| {
            if caps.name("anchor").is_some() {
                return caps[0].to_string();
            }
            let img = &caps["img"];
            let Some(src) = IMG_SRC_RE.captures(img).map(|c| c["src"].to_string()) else {
                return caps[0].to_string();
            };
            if !src.contains(".preview.") {
                return caps[0].to_string();
            }
            let full = src.replace(".preview.", ".");
            tracing::debug!("为预览图生成放大链接：{src}");
            format!(r#"<a href="{full}" class="magnific">{img}</a>"#)
        })
        .into_owned()
}

/// 遗留代码块标签统一为 <pre class="prettyprint"><code> 结构
///
/// 块内容先收进占位符表，避免后续遍历再次匹配到生成的 <code>；
/// 接着把落在段落里的占位符挪出段落，最后回填。
fn code_to_prettify(html: &str, tag_patterns: &[Regex; 2]) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut out = html.to_string();

    for re in tag_patterns {
        out = re
            .replace_all(&out, |caps: &Captures| {
                let body = BR_RE.replace_all(&caps["body"], "");
                let body = body.trim_matches(['\n', '\r']);
                let class = match caps
                    .name("attrs")
                    .and_then(|attrs| LANG_ATTR_RE.captures(attrs.as_str()))
                {
                    Some(lang) => format!("prettyprint lang-{}", &lang["lang"]),
                    None => "prettyprint".to_string(),
                };
                blocks.push(format!("<pre class=\"{class}\"><code>{body}</code></pre>"));
                format!("\u{1}{}\u{1}", blocks.len() - 1)
            })
            .into_owned();
    }

    if blocks.is_empty() {
        return out;
    }

    out = lift_out_of_paragraphs(&out);
    out = EMPTY_P_RE.replace_all(&out, "").into_owned();

    PLACEHOLDER_RE
        .replace_all(&out, |caps: &Captures| {
            let index: usize = caps["idx"].parse().unwrap_or(0);
            blocks.get(index).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// 段落内的占位符前后补 </p> 和 <p>，把代码块挪到段落外
fn lift_out_of_paragraphs(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut in_paragraph = false;
    let mut i = 0;

    while i < html.len() {
        let rest = &html[i..];

        if let Some(tag_len) = paragraph_open_len(rest) {
            in_paragraph = true;
            out.push_str(&rest[..tag_len]);
            i += tag_len;
        } else if rest.starts_with("</p>") {
            in_paragraph = false;
            out.push_str("</p>");
            i += 4;
        } else if rest.starts_with('\u{1}') {
            let token_len = placeholder_len(rest);
            if in_paragraph {
                out.push_str("</p>");
                out.push_str(&rest[..token_len]);
                out.push_str("<p>");
            } else {
                out.push_str(&rest[..token_len]);
            }
            i += token_len;
        } else {
            let ch_len = rest.chars().next().map_or(1, char::len_utf8);
            out.push_str(&rest[..ch_len]);
            i += ch_len;
        }
    }

    out
}

/// <p> 或 <p attr> 的标签长度；<pre> 等不算段落
fn paragraph_open_len(s: &str) -> Option<usize> {
    if !s.starts_with("<p") {
        return None;
    }
    match s.as_bytes().get(2) {
        Some(b'>') => Some(3),
        Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => s.find('>').map(|pos| pos + 1),
        _ => None,
    }
}

fn placeholder_len(s: &str) -> usize {
    match s[1..].find('\u{1}') {
        Some(pos) => pos + 2,
        None => s.len(),
    }
}
