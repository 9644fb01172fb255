// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use markup5ever_rcdom::Handle;
use tokio::sync::mpsc;

use wordweave::parsers::html::find_elements;
use wordweave::translation::pipeline::is_marker;
use wordweave::translation::{
    ConfigSource, ControllerHandle, DictionaryProvider, ExtensionConfig, Page, PageController,
    PipelineSettings, StatusEvent, TranslationCoordinator, TranslationError, TranslationGateway,
    TranslationProvider, TranslationRate, TranslationResult,
};

/// HTML 测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 常规文章页面
    pub fn create_article_page() -> String {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Test Page</title>
    <meta charset="UTF-8">
</head>
<body>
    <header><p>Welcome to the site header with many words</p></header>
    <nav><a href="/">Home page link</a> <a href="/about">About the team</a></nav>
    <h1>The cat and the dog are friends</h1>
    <p>The quick brown fox jumps over the lazy dog near the river.</p>
    <p>My cat likes to sleep in the sun with the <strong>dog</strong> every day.</p>
    <button>Click here to read the whole story about the cat</button>
    <div translate="no">The cat in this block must never change at all.</div>
    <pre>let cat = dog; // the cat and the dog</pre>
    <p>Short</p>
</body>
</html>"#
            .to_string()
    }

    /// `count` 个段落，每段只有一个可翻译的实词
    pub fn create_numbered_page(words: &[&str]) -> String {
        let mut html = String::from("<html><body>");
        for word in words {
            html.push_str(&format!("<p>It is for the {}</p>", word));
        }
        html.push_str("</body></html>");
        html
    }

    pub fn count_markers(root: &Handle) -> usize {
        find_elements(root, &|node: &Handle| is_marker(node)).len()
    }
}

/// 测试用词典
pub fn spanish_dictionary() -> DictionaryProvider {
    DictionaryProvider::new()
        .with_entry("es", "cat", "gato")
        .with_entry("es", "dog", "perro")
        .with_entry("es", "quick", "rápido")
        .with_entry("es", "brown", "marrón")
        .with_entry("es", "fox", "zorro")
        .with_entry("es", "jumps", "salta")
        .with_entry("es", "lazy", "perezoso")
        .with_entry("es", "river", "río")
        .with_entry("es", "sleep", "dormir")
        .with_entry("es", "sun", "sol")
        .with_entry("es", "day", "día")
        .with_entry("es", "likes", "gusta")
        .with_entry("es", "near", "cerca")
        .with_entry("es", "every", "cada")
        .with_entry("es", "friends", "amigos")
}

/// 记录调用次数的提供者；可在翻译指定词时向控制器发送事件
pub struct CountingProvider {
    inner: DictionaryProvider,
    pub calls: Rc<Cell<usize>>,
    pub seen: Rc<RefCell<Vec<String>>>,
    trigger: Option<(String, Box<dyn Fn()>)>,
}

impl CountingProvider {
    pub fn new(inner: DictionaryProvider) -> Self {
        Self {
            inner,
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
            trigger: None,
        }
    }

    /// 翻译 `word` 时执行 `action`
    pub fn on_word<F>(mut self, word: &str, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.trigger = Some((word.to_string(), Box::new(action)));
        self
    }
}

#[async_trait(?Send)]
impl TranslationProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslationResult<String> {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(text.to_string());
        if let Some((word, action)) = &self.trigger {
            if word == text {
                action();
            }
        }
        self.inner.translate(text, source, target).await
    }
}

/// 总是失败的提供者
pub struct FailingProvider;

#[async_trait(?Send)]
impl TranslationProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _: &str, _: &str, _: &str) -> TranslationResult<String> {
        Err(TranslationError::NetworkError("connection refused".to_string()))
    }
}

/// 前 `failures` 次加载失败的配置来源
pub struct FlakyConfigSource {
    config: ExtensionConfig,
    failures: usize,
    pub attempts: Cell<usize>,
}

impl FlakyConfigSource {
    pub fn new(config: ExtensionConfig, failures: usize) -> Self {
        Self {
            config,
            failures,
            attempts: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl ConfigSource for FlakyConfigSource {
    async fn load(&self) -> TranslationResult<ExtensionConfig> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt <= self.failures {
            Err(TranslationError::ConfigError("storage unavailable".to_string()))
        } else {
            Ok(self.config.clone())
        }
    }
}

/// 启用状态、强度最高的测试配置
pub fn enabled_config() -> ExtensionConfig {
    ExtensionConfig {
        enabled: true,
        translation_rate: TranslationRate::Intensive,
        auto_detect_language: false,
        source_language: "en".to_string(),
        target_language: "es".to_string(),
        ..Default::default()
    }
}

/// 测试环境：页面控制器、句柄与状态通知
pub struct TestEnvironment {
    pub controller: PageController,
    pub handle: ControllerHandle,
    pub status: mpsc::UnboundedReceiver<StatusEvent>,
    pub document: Handle,
}

impl TestEnvironment {
    pub fn new(html: &str, url: Option<&str>, gateway: TranslationGateway) -> Self {
        let settings = PipelineSettings::default();
        let coordinator = TranslationCoordinator::new(gateway, &settings);
        let page = Page::parse(html.as_bytes(), url).unwrap();
        let document = page.document().clone();

        let (controller, handle) = PageController::new(page, coordinator, settings);
        let mut controller = controller.with_seed(42);
        let status = controller.status_events();

        Self {
            controller,
            handle,
            status,
            document,
        }
    }

    pub fn with_provider<P: TranslationProvider + 'static>(html: &str, provider: P) -> Self {
        Self::new(html, None, TranslationGateway::default().with_provider(provider))
    }

    /// 取出目前为止的状态通知
    pub fn drain_status(&mut self) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.status.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn markers(&self) -> usize {
        HtmlTestHelper::count_markers(&self.document)
    }
}
