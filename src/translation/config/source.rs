//! 配置来源
//!
//! 控制器启动时通过 `ConfigSource` 获取初始配置；失败时由控制器负责退避重试。

use std::path::PathBuf;

use async_trait::async_trait;

use super::manager::{ConfigManager, ExtensionConfig};
use crate::translation::error::TranslationResult;

/// 配置来源（扩展存储、配置文件等）
#[async_trait(?Send)]
pub trait ConfigSource {
    async fn load(&self) -> TranslationResult<ExtensionConfig>;
}

/// 固定配置
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    config: ExtensionConfig,
}

impl StaticConfigSource {
    pub fn new(config: ExtensionConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl ConfigSource for StaticConfigSource {
    async fn load(&self) -> TranslationResult<ExtensionConfig> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// 从 TOML 文件（及环境变量覆盖）读取配置
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> TranslationResult<ExtensionConfig> {
        let file = ConfigManager::with_path(&self.path).load()?;
        Ok(file.extension)
    }
}
