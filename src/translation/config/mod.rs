//! 配置管理模块
//!
//! 扩展配置快照、管道调优参数、配置来源，以及全局常量

pub mod manager;
pub mod source;

// 重新导出主要类型
pub use manager::{
    ConfigFile, ConfigManager, ExtensionConfig, FontSize, PipelineSettings, TranslationRate,
    TranslationStrategy,
};
pub use source::{ConfigSource, FileConfigSource, StaticConfigSource};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 容器扫描相关
    pub const MIN_CONTAINER_CHARS: usize = 15;
    pub const MIN_ALPHA_RUNS: usize = 2;
    pub const INTERACTIVE_ESCAPE_MIN_CHARS: usize = 50;
    pub const MAX_CONTAINERS_PER_PASS: usize = 50;

    // 词语提取相关
    pub const MIN_TOKEN_CHARS: usize = 3;
    pub const MAX_TOKEN_CHARS: usize = 15;

    // 缓存设置
    pub const CACHE_MAX_ENTRIES: usize = 1000;
    pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

    // 请求节流
    pub const REQUEST_SPACING: Duration = Duration::from_millis(150);
    pub const MAX_IN_FLIGHT_REQUESTS: usize = 5;
    pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
    pub const MAX_FALLBACK_PROVIDERS: usize = 1;

    // 控制器时序
    pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);
    pub const MUTATION_DEBOUNCE: Duration = Duration::from_millis(500);
    pub const INIT_RETRY_BASE: Duration = Duration::from_secs(2);
    pub const MAX_INIT_ATTEMPTS: usize = 3;

    // 语言检测
    pub const DETECTION_MIN_CONFIDENCE: f32 = 0.15;
    pub const DETECTION_MIN_HITS: usize = 2;
    pub const FALLBACK_LANGUAGE: &str = "en";

    // 标记元素
    pub const MARKER_TAG: &str = "span";
    pub const MARKER_CLASS: &str = "ww-word";
    pub const ORIGINAL_ATTR: &str = "data-original";
    pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#4a90e2";

    // 永不翻译的类名（包括本扩展自己注入的界面元素）
    pub const NO_TRANSLATE_CLASSES: &[&str] = &[
        "notranslate",
        "no-translate",
        MARKER_CLASS,
        "ww-popup",
        "ww-notification",
        "ww-progress-container",
    ];

    // 跳过的元素
    pub const SKIP_ELEMENTS: &[&str] = &[
        "script", "style", "code", "pre", "input", "textarea", "select", "svg", "canvas",
        "video", "audio", "noscript", "template", "iframe", "math", "head",
    ];

    // 交互控件
    pub const INTERACTIVE_ELEMENTS: &[&str] = &["a", "button", "nav", "menu"];
    pub const INTERACTIVE_ROLES: &[&str] = &["button", "navigation", "menu", "menubar", "menuitem"];

    // 交互控件内仍可独立翻译的块级元素
    pub const BLOCK_ELEMENTS: &[&str] = &[
        "p", "div", "span", "li", "section", "article", "blockquote", "td", "th", "dd", "dt",
        "figcaption",
    ];

    pub const HEADING_ELEMENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
    pub const NAVIGATION_ELEMENTS: &[&str] = &["nav", "header"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "wordweave.toml",
        ".wordweave.toml",
        "~/.config/wordweave/config.toml",
    ];
}
