use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod archive;
mod config;
mod import;
mod locale;
mod repository;
mod sitemap;
mod urls;

use archive::{ArchiveRequest, ArchiveService};
use config::SiteConfig;

#[derive(Parser)]
#[command(name = "blogarc", about = "博客归档引擎", version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染某年/月/日的归档表与翻页导航
    Archive {
        /// 归档年份
        year: i32,

        /// 月份（1-12）
        #[arg(short, long)]
        month: Option<u32>,

        /// 日（需要同时给出月份）
        #[arg(short, long)]
        day: Option<u32>,

        /// 按分类 slug 过滤
        #[arg(short, long)]
        category: Option<String>,

        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// 输出归档年份的站点地图条目并生成 sitemap.xml
    Sitemap {
        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// sitemap.xml 的输出路径；不给则仅打印条目
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 预处理 Drupal 6 导出的 CSV 以便导入
    Preprocess {
        /// 输入 CSV 文件
        input: PathBuf,

        /// 输出 CSV 文件
        output: PathBuf,

        /// 文件链接的新位置（如 /storage/app/old-files，无尾部斜杠）
        #[arg(long)]
        files: Option<String>,

        /// 把指向该域名的绝对链接改为根相对
        #[arg(long)]
        external_domain: Option<String>,

        /// rel="lightbox" 替换为 class="magnific"
        #[arg(long)]
        lightbox_to_magnific: bool,

        /// 给没有链接包裹的预览图补放大链接
        #[arg(long)]
        magnify_previews: bool,

        /// 遗留代码块标签统一为 prettyprint 结构
        #[arg(long)]
        code_to_prettify: bool,

        /// 项目根目录（默认当前目录，读取 [import] 配置默认值）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let root = match &cli.command {
        Commands::Archive { root, .. }
        | Commands::Sitemap { root, .. }
        | Commands::Preprocess { root, .. } => root.clone(),
    };
    let config = SiteConfig::load_or_default(&root);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.site.log_level)),
        )
        .init();

    match cli.command {
        Commands::Archive {
            year,
            month,
            day,
            category,
            root,
        } => {
            let request = ArchiveRequest {
                year: Some(year),
                month,
                day,
                category,
            };
            run_runtime(run_archive(root, config, request))?;
        }
        Commands::Sitemap { root, output } => {
            run_runtime(run_sitemap(root, config, output))?;
        }
        Commands::Preprocess {
            input,
            output,
            files,
            external_domain,
            lightbox_to_magnific,
            magnify_previews,
            code_to_prettify,
            ..
        } => {
            // 命令行选项优先，其次取 [import] 配置
            let options = import::ImportOptions {
                file_links: files.unwrap_or_else(|| config.import.files_path.clone()),
                external_domain: external_domain
                    .unwrap_or_else(|| config.import.external_domain.clone()),
                lightbox_to_magnific: lightbox_to_magnific || config.import.lightbox_to_magnific,
                magnify_previews: magnify_previews || config.import.magnify_previews,
                code_to_prettify: code_to_prettify || config.import.code_to_prettify,
            };
            import::run(&input, &output, &options)?;
        }
    }

    Ok(())
}

fn run_runtime<F: Future<Output = anyhow::Result<()>>>(future: F) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

async fn run_archive(
    root: PathBuf,
    config: SiteConfig,
    request: ArchiveRequest,
) -> anyhow::Result<()> {
    let db = open_database(&root, &config).await?;
    let service = ArchiveService::new(db, &config);
    let now = chrono::Utc::now();

    let table = match service.get_archive(&request, now).await {
        Ok(table) => table,
        Err(archive::ArchiveError::NotFound) => {
            anyhow::bail!("归档不存在")
        }
    };
    let pager = service.get_pager(&request, now).await?;

    if table.is_empty() {
        println!("（该区间没有文章）");
    }
    for group in table.groups() {
        println!("{}", group.month);
        for entry in &group.entries {
            if entry.category.is_empty() {
                println!(
                    "  {}  {}  {}",
                    entry.published_at.format("%Y-%m-%d"),
                    entry.title,
                    entry.url,
                );
            } else {
                println!(
                    "  {}  {}  {}  [{} {}]",
                    entry.published_at.format("%Y-%m-%d"),
                    entry.title,
                    entry.url,
                    entry.category,
                    entry.category_url,
                );
            }
        }
    }

    println!();
    println!(
        "上一页：{}{}",
        pager.previous_text,
        format_pager_url(&pager.previous_url),
    );
    println!(
        "下一页：{}{}",
        pager.next_text,
        format_pager_url(&pager.next_url),
    );

    Ok(())
}

fn format_pager_url(url: &str) -> String {
    if url.is_empty() {
        "（无链接）".to_string()
    } else {
        format!("  {url}")
    }
}

async fn run_sitemap(
    root: PathBuf,
    config: SiteConfig,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let db = open_database(&root, &config).await?;
    let years = sitemap::SitemapYears::new(db, &config);
    let entries = years.enumerate(chrono::Utc::now()).await;

    for entry in &entries {
        println!(
            "{}  {}  {}",
            entry.mtime.format("%Y-%m-%d"),
            entry.title,
            entry.url,
        );
    }

    if let Some(path) = output {
        let xml = sitemap::write_xml(&entries, &config.site.url);
        std::fs::write(&path, xml)?;
        tracing::info!("已生成 {}", path.display());
    }

    Ok(())
}

async fn open_database(root: &PathBuf, config: &SiteConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let db_path = root.join(&config.database.path);
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let pool = sqlx::SqlitePool::connect(&db_url).await?;
    repository::init_schema(&pool).await?;
    Ok(pool)
}

const fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ",
        env!("BLOGARC_GIT_COMMIT"),
        "\nbuild:   ",
        env!("BLOGARC_BUILD_TIME"),
        "\ntarget:  ",
        env!("BLOGARC_BUILD_TARGET"),
        "\nprofile: ",
        env!("BLOGARC_BUILD_PROFILE"),
    )
}
