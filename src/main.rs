//! 命令行入口：对保存下来的 HTML 页面执行一次完整的翻译扫描

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use wordweave::logging::init_tracing;
use wordweave::translation::{
    ConfigManager, ControllerState, DeepLxProvider, DictionaryProvider, LibreTranslateProvider,
    Page, PageController, StaticConfigSource, StatusEvent, TranslationCoordinator,
    TranslationGateway, TranslationRate, TranslationResult,
};

#[derive(Parser, Debug)]
#[command(name = "wordweave")]
#[command(version, about = "Swap a share of the words on an HTML page for their translations", long_about = None)]
struct Args {
    /// Input HTML file ("-" reads stdin)
    #[arg(value_name = "HTML")]
    input: PathBuf,

    /// Config file (TOML); defaults to the usual search paths
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Offline dictionary (TOML, one table per target language)
    #[arg(long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// DeepLX endpoint URL
    #[arg(long, value_name = "URL")]
    deeplx: Option<String>,

    /// LibreTranslate endpoint URL
    #[arg(long, value_name = "URL")]
    libretranslate: Option<String>,

    /// Page URL, used for the site exclusion list
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Target language code
    #[arg(short, long)]
    target: Option<String>,

    /// Source language code
    #[arg(short, long)]
    source: Option<String>,

    /// Translation rate (minimal, light, moderate, medium, heavy, intensive)
    #[arg(short, long)]
    rate: Option<String>,

    /// Output file; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Seed for word selection
    #[arg(long)]
    seed: Option<u64>,

    /// Restore the page after translating and write the restored document
    #[arg(long)]
    restore: bool,
}

/// 提供者参数；在命令行中出现的先后顺序即回退顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderFlag {
    Dictionary,
    DeepLx,
    LibreTranslate,
}

impl ProviderFlag {
    const ALL: [ProviderFlag; 3] = [
        ProviderFlag::Dictionary,
        ProviderFlag::DeepLx,
        ProviderFlag::LibreTranslate,
    ];

    fn id(self) -> &'static str {
        match self {
            ProviderFlag::Dictionary => "dictionary",
            ProviderFlag::DeepLx => "deeplx",
            ProviderFlag::LibreTranslate => "libretranslate",
        }
    }
}

fn provider_order(matches: &ArgMatches) -> Vec<ProviderFlag> {
    let mut present: Vec<(usize, ProviderFlag)> = ProviderFlag::ALL
        .iter()
        .filter_map(|flag| matches.index_of(flag.id()).map(|index| (index, *flag)))
        .collect();
    present.sort_by_key(|(index, _)| *index);
    present.into_iter().map(|(_, flag)| flag).collect()
}

fn env_help() -> String {
    let mut help = String::from("Environment variables:\n");
    for (name, description) in wordweave::env::describe_all() {
        help.push_str(&format!("  {:<32} {}\n", name, description));
    }
    help
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let matches = Args::command().after_help(env_help()).get_matches();
    let order = provider_order(&matches);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = run(args, &order).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args, order: &[ProviderFlag]) -> TranslationResult<()> {
    let html = read_input(&args.input)?;

    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut file = manager.load()?;
    file.extension.enabled = true;
    if let Some(target) = &args.target {
        file.extension.target_language = target.to_lowercase();
    }
    if let Some(source) = &args.source {
        file.extension.source_language = source.to_lowercase();
        file.extension.auto_detect_language = false;
    }
    if let Some(rate) = &args.rate {
        file.extension.translation_rate = TranslationRate::parse(rate).ok_or_else(|| {
            wordweave::TranslationError::ConfigError(format!("无效的翻译强度: {}", rate))
        })?;
    }
    file.validate()?;

    let mut gateway = TranslationGateway::new(&file.pipeline);
    for flag in order {
        gateway = match (flag, &args.dictionary, &args.deeplx, &args.libretranslate) {
            (ProviderFlag::Dictionary, Some(path), _, _) => {
                gateway.with_provider(DictionaryProvider::from_file(path)?)
            }
            (ProviderFlag::DeepLx, _, Some(url), _) => gateway.with_provider(DeepLxProvider::new(url)?),
            (ProviderFlag::LibreTranslate, _, _, Some(url)) => {
                gateway.with_provider(LibreTranslateProvider::new(url)?)
            }
            _ => gateway,
        };
    }
    if gateway.is_empty() {
        return Err(wordweave::TranslationError::NoProviders);
    }

    let coordinator = TranslationCoordinator::new(gateway, &file.pipeline);
    let page = Page::parse(&html, args.url.as_deref())?;
    let (controller, handle) = PageController::new(page, coordinator, file.pipeline.clone());
    let mut controller = match args.seed {
        Some(seed) => controller.with_seed(seed),
        None => controller,
    };
    let mut status = controller.status_events();

    let state = controller
        .initialize(&StaticConfigSource::new(file.extension.clone()))
        .await;
    if state == ControllerState::SiteExcluded {
        tracing::warn!("页面站点在排除列表中，原样输出");
    } else {
        handle.force_reprocess()?;
        controller.process_pending_events().await;

        if args.restore {
            handle.force_restore()?;
            controller.process_pending_events().await;
        }
    }

    while let Ok(event) = status.try_recv() {
        match event {
            StatusEvent::ScanFinished { translated } => tracing::info!("已插入 {} 个译文标记", translated),
            StatusEvent::Restored { markers } => tracing::info!("已还原 {} 个译文标记", markers),
            _ => {}
        }
    }

    write_output(args.output.as_ref(), controller.page().to_html()?.as_bytes())
}

fn read_input(path: &PathBuf) -> TranslationResult<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(path)?)
    }
}

fn write_output(path: Option<&PathBuf>, data: &[u8]) -> TranslationResult<()> {
    match path {
        Some(path) => fs::write(path, data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
