//! 翻译系统核心模块
//!
//! 页面级的翻译流程：
//!
//! - **网关** (`gateway.rs`): 主/备用提供者、超时
//! - **提供者** (`providers.rs`): DeepLX、LibreTranslate、离线词典
//! - **协调器** (`coordinator.rs`): 缓存、请求节流、有界并发、源语言决策
//! - **控制器** (`controller.rs`): 启用/停用、配置更新与 DOM 变更驱动的状态机
//!
//! ## 模块依赖关系
//!
//! ```text
//! PageController (controller.rs)
//!     ├── TextScanner / WordSelector / DomRewriter (pipeline/)
//!     └── TranslationCoordinator (coordinator.rs)
//!             ├── TranslationCache (storage/cache.rs)
//!             └── TranslationGateway (gateway.rs)
//!                     └── TranslationProvider (providers.rs)
//! ```

pub mod controller;
pub mod coordinator;
pub mod gateway;
pub mod page;
pub mod providers;

pub use controller::{
    ControlMessage, ControllerHandle, ControllerState, PageController, PageEvent, ScanKind,
    ScanTimer, SelectionOutcome, StatusEvent,
};
pub use coordinator::{is_usable_translation, RequestLimiter, TranslationCoordinator, TranslationMap};
pub use gateway::TranslationGateway;
pub use page::Page;
pub use providers::{DeepLxProvider, DictionaryProvider, LibreTranslateProvider, TranslationProvider};
