//! 翻译模块
//!
//! 页面内的渐进式词语翻译，采用清晰的模块化架构：
//! - **core**: 网关、提供者、批次协调器与页面控制器
//! - **pipeline**: 容器扫描、过滤、选词与 DOM 改写
//! - **storage**: 词语翻译缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use wordweave::translation::{
//!     DictionaryProvider, ExtensionConfig, Page, PageController, PipelineSettings,
//!     StaticConfigSource, TranslationCoordinator, TranslationGateway,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = PipelineSettings::default();
//! let gateway = TranslationGateway::new(&settings)
//!     .with_provider(DictionaryProvider::new().with_entry("es", "cat", "gato"));
//! let coordinator = TranslationCoordinator::new(gateway, &settings);
//!
//! let page = Page::parse(b"<p>The cat sleeps on the warm mat</p>", None)?;
//! let (mut controller, handle) = PageController::new(page, coordinator, settings);
//!
//! let config = ExtensionConfig { enabled: true, ..Default::default() };
//! controller.initialize(&StaticConfigSource::new(config)).await;
//! handle.force_reprocess()?;
//! controller.process_pending_events().await;
//! println!("{}", controller.page().to_html()?);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 扩展配置快照、管道参数与配置来源
pub mod config;

/// 核心模块 - 网关、协调器与页面控制器
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 文本处理管道模块 - 扫描、过滤、选词与改写
pub mod pipeline;

/// 存储管理模块 - 词语翻译缓存
pub mod storage;

// ============================================================================
// 公共API导出
// ============================================================================

pub use config::{
    ConfigFile, ConfigManager, ConfigSource, ExtensionConfig, FileConfigSource, FontSize,
    PipelineSettings, StaticConfigSource, TranslationRate, TranslationStrategy,
};
pub use core::{
    ControlMessage, ControllerHandle, ControllerState, DeepLxProvider, DictionaryProvider,
    LibreTranslateProvider, Page, PageController, PageEvent, SelectionOutcome, StatusEvent,
    TranslationCoordinator, TranslationGateway, TranslationMap, TranslationProvider,
};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use pipeline::{Container, DomRewriter, MarkerStyle, TextFilter, TextScanner, WordSelector};
pub use storage::TranslationCache;
