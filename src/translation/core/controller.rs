//! 页面控制器
//!
//! 响应启用/停用、配置更新与 DOM 变更的状态机。同一时刻最多只有一次扫描在进行；
//! 扫描期间到达的事件在容器之间被取出处理：停用或强制还原会在当前容器完成后中止扫描，
//! 其余事件推迟到扫描结束后再处理。

use std::time::Duration;

use markup5ever_rcdom::{Handle, NodeData};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, sleep_until, Instant};

use super::coordinator::TranslationCoordinator;
use super::page::Page;
use crate::parsers::html::text_content;
use crate::translation::config::{ConfigSource, ExtensionConfig, PipelineSettings};
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::pipeline::rewriter::is_marker;
use crate::translation::pipeline::scanner::is_attached;
use crate::translation::pipeline::{DomRewriter, MarkerStyle, TextFilter, TextScanner, WordSelector};

// ============================================================================
// 事件与状态
// ============================================================================

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Ready { enabled: bool },
    Processing,
    /// 当前站点在排除列表中，不再做任何处理
    SiteExcluded,
    /// 配置多次获取失败，本页面放弃处理
    Inert,
}

/// 外部控制消息
#[derive(Debug)]
pub enum ControlMessage {
    ConfigUpdated(ExtensionConfig),
    TranslateText {
        text: String,
        source_lang: Option<String>,
        target_lang: Option<String>,
        reply: Option<oneshot::Sender<SelectionOutcome>>,
    },
    ForceReprocess,
    ForceRestore,
}

/// 控制器事件
#[derive(Debug)]
pub enum PageEvent {
    Control(ControlMessage),
    /// 新增到文档中的节点
    Mutation(Vec<Handle>),
    Shutdown,
}

/// 非阻塞的状态通知
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    ScanStarted { total: usize },
    Progress { done: usize, total: usize },
    ScanFinished { translated: usize },
    ScanCancelled,
    Restored { markers: usize },
    Notice { message: String },
}

/// 划词翻译结果
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Translated { original: String, translation: String },
    Failed { notice: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Full,
    Incremental,
}

/// 已排期的扫描；重新排期时旧计时器作废
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimer {
    pub id: u64,
    pub deadline: Instant,
    pub kind: ScanKind,
}

/// 扫描期间对新事件的处理结果
enum Interrupt {
    None,
    Cancel,
}

// ============================================================================
// 控制器句柄
// ============================================================================

/// 向控制器发送事件的句柄
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<PageEvent>,
}

impl ControllerHandle {
    fn send(&self, event: PageEvent) -> TranslationResult<()> {
        self.tx
            .send(event)
            .map_err(|_| TranslationError::InternalError("控制器已停止".to_string()))
    }

    pub fn update_config(&self, config: ExtensionConfig) -> TranslationResult<()> {
        self.send(PageEvent::Control(ControlMessage::ConfigUpdated(config)))
    }

    pub fn notify_mutation(&self, added: Vec<Handle>) -> TranslationResult<()> {
        self.send(PageEvent::Mutation(added))
    }

    pub fn force_reprocess(&self) -> TranslationResult<()> {
        self.send(PageEvent::Control(ControlMessage::ForceReprocess))
    }

    pub fn force_restore(&self) -> TranslationResult<()> {
        self.send(PageEvent::Control(ControlMessage::ForceRestore))
    }

    pub fn shutdown(&self) -> TranslationResult<()> {
        self.send(PageEvent::Shutdown)
    }

    /// 请求划词翻译并等待结果
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> TranslationResult<SelectionOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(PageEvent::Control(ControlMessage::TranslateText {
            text: text.to_string(),
            source_lang: source_lang.map(str::to_string),
            target_lang: target_lang.map(str::to_string),
            reply: Some(reply),
        }))?;

        rx.await
            .map_err(|_| TranslationError::InternalError("控制器未返回结果".to_string()))
    }
}

// ============================================================================
// 控制器
// ============================================================================

/// 单个页面的控制器
pub struct PageController {
    page: Page,
    settings: PipelineSettings,
    config: Option<ExtensionConfig>,
    state: ControllerState,
    coordinator: TranslationCoordinator,
    rewriter: DomRewriter,
    events: mpsc::UnboundedReceiver<PageEvent>,
    status: Option<mpsc::UnboundedSender<StatusEvent>>,
    timer: Option<ScanTimer>,
    next_timer_id: u64,
    pending_nodes: Vec<Handle>,
    rng: StdRng,
    shutdown_requested: bool,
}

impl PageController {
    pub fn new(
        page: Page,
        coordinator: TranslationCoordinator,
        settings: PipelineSettings,
    ) -> (Self, ControllerHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let controller = Self {
            page,
            settings,
            config: None,
            state: ControllerState::Uninitialized,
            coordinator,
            rewriter: DomRewriter::new(),
            events,
            status: None,
            timer: None,
            next_timer_id: 0,
            pending_nodes: Vec::new(),
            rng: StdRng::from_entropy(),
            shutdown_requested: false,
        };
        (controller, ControllerHandle { tx })
    }

    /// 订阅状态通知
    pub fn status_events(&mut self) -> mpsc::UnboundedReceiver<StatusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.status = Some(tx);
        rx
    }

    /// 固定选词随机源
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> Option<&ExtensionConfig> {
        self.config.as_ref()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn coordinator(&self) -> &TranslationCoordinator {
        &self.coordinator
    }

    pub fn rewriter(&self) -> &DomRewriter {
        &self.rewriter
    }

    pub fn scheduled_scan(&self) -> Option<ScanTimer> {
        self.timer
    }

    /// 是否已收到 `Shutdown`
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_requested
    }

    fn is_enabled(&self) -> bool {
        matches!(self.state, ControllerState::Ready { enabled: true })
    }

    fn emit(&self, event: StatusEvent) {
        if let Some(status) = &self.status {
            let _ = status.send(event);
        }
    }

    // ------------------------------------------------------------------------
    // 初始化
    // ------------------------------------------------------------------------

    /// 获取初始配置；失败时指数退避重试，超过上限后本页面不再处理
    pub async fn initialize(&mut self, source: &dyn ConfigSource) -> ControllerState {
        let max_attempts = self.settings.max_init_attempts.max(1);

        for attempt in 1..=max_attempts {
            match source.load().await {
                Ok(config) => {
                    if attempt > 1 {
                        tracing::info!("第 {} 次尝试获取配置成功", attempt);
                    }
                    self.apply_initial_config(config);
                    return self.state;
                }
                Err(e) => {
                    if attempt < max_attempts {
                        let delay = self.settings.init_retry_base() * 2u32.pow(attempt as u32 - 1);
                        tracing::warn!(
                            "获取配置失败，{:.1}秒后进行第 {} 次重试: {}",
                            delay.as_secs_f32(),
                            attempt + 1,
                            e
                        );
                        sleep(delay).await;
                    } else {
                        tracing::error!("获取配置 {} 次均失败，本页面停止处理: {}", max_attempts, e);
                    }
                }
            }
        }

        self.state = ControllerState::Inert;
        self.state
    }

    fn apply_initial_config(&mut self, config: ExtensionConfig) {
        if self.page.hostname().map(|h| config.is_site_excluded(h)).unwrap_or(false) {
            tracing::info!("站点在排除列表中: {:?}", self.page.hostname());
            self.config = Some(config);
            self.state = ControllerState::SiteExcluded;
            return;
        }

        let enabled = config.enabled;
        self.config = Some(config);
        self.state = ControllerState::Ready { enabled };
        tracing::info!("控制器就绪 (enabled = {})", enabled);

        if enabled {
            self.schedule_scan(ScanKind::Full, self.settings.settle_delay());
        }
    }

    // ------------------------------------------------------------------------
    // 事件循环
    // ------------------------------------------------------------------------

    /// 初始化并处理事件，直到收到 `Shutdown` 或所有句柄被丢弃
    pub async fn run(&mut self, source: &dyn ConfigSource) {
        let state = self.initialize(source).await;
        if matches!(state, ControllerState::SiteExcluded | ControllerState::Inert) {
            return;
        }

        loop {
            let deadline = self.timer.map(|t| t.deadline);

            tokio::select! {
                event = self.events.recv() => match event {
                    Some(PageEvent::Shutdown) | None => self.shutdown_requested = true,
                    Some(event) => self.handle_event(event).await,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_timer().await;
                }
            }

            if self.shutdown_requested || matches!(self.state, ControllerState::SiteExcluded) {
                break;
            }
        }

        tracing::debug!("控制器事件循环结束");
    }

    /// 处理所有已到达的事件（不等待）
    pub async fn process_pending_events(&mut self) {
        while !self.shutdown_requested {
            match self.events.try_recv() {
                Ok(PageEvent::Shutdown) => self.shutdown_requested = true,
                Ok(event) => self.handle_event(event).await,
                Err(_) => break,
            }
        }
    }

    /// 处理单个事件
    pub async fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Control(ControlMessage::ForceReprocess) => {
                if self.is_enabled() {
                    self.cancel_timer();
                    self.run_scan(ScanKind::Full).await;
                } else {
                    tracing::debug!("未启用，忽略强制重新处理");
                }
            }
            other => self.dispatch(other).await,
        }
    }

    /// 处理不会直接触发扫描的事件
    async fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::Control(ControlMessage::ConfigUpdated(config)) => self.on_config_updated(config),
            PageEvent::Control(ControlMessage::TranslateText {
                text,
                source_lang,
                target_lang,
                reply,
            }) => {
                let outcome = self
                    .translate_selection(&text, source_lang.as_deref(), target_lang.as_deref())
                    .await;
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            PageEvent::Control(ControlMessage::ForceRestore) => {
                self.cancel_timer();
                self.restore_page();
            }
            PageEvent::Control(ControlMessage::ForceReprocess) => {
                if self.is_enabled() {
                    self.schedule_scan(ScanKind::Full, Duration::ZERO);
                }
            }
            PageEvent::Mutation(nodes) => self.on_mutation(nodes),
            PageEvent::Shutdown => self.shutdown_requested = true,
        }
    }

    /// 到期时执行已排期的扫描；返回是否执行了扫描
    pub async fn fire_timer(&mut self) -> bool {
        match self.timer {
            Some(timer) if timer.deadline <= Instant::now() => {
                self.timer = None;
                if self.is_enabled() {
                    self.run_scan(timer.kind).await;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // 状态转换
    // ------------------------------------------------------------------------

    fn on_config_updated(&mut self, config: ExtensionConfig) {
        if let Err(e) = config.validate() {
            helpers::log_error(&e);
            return;
        }

        match self.state {
            ControllerState::Uninitialized => {
                self.apply_initial_config(config);
                return;
            }
            ControllerState::SiteExcluded | ControllerState::Inert => return,
            ControllerState::Ready { .. } | ControllerState::Processing => {}
        }

        if self.page.hostname().map(|h| config.is_site_excluded(h)).unwrap_or(false) {
            tracing::info!("站点被加入排除列表，还原页面");
            self.cancel_timer();
            self.restore_page();
            self.config = Some(config);
            self.state = ControllerState::SiteExcluded;
            return;
        }

        let was_enabled = self.is_enabled();
        let language_changed = self
            .config
            .as_ref()
            .map(|old| {
                old.target_language != config.target_language
                    || old.source_language != config.source_language
                    || old.auto_detect_language != config.auto_detect_language
            })
            .unwrap_or(false);

        let enabled = config.enabled;
        self.config = Some(config);
        self.state = ControllerState::Ready { enabled };

        match (was_enabled, enabled) {
            (false, true) => {
                tracing::info!("已启用，等待页面稳定后扫描");
                self.schedule_scan(ScanKind::Full, self.settings.settle_delay());
            }
            (true, false) => {
                tracing::info!("已停用，还原页面");
                self.cancel_timer();
                self.restore_page();
            }
            (true, true) if language_changed => {
                tracing::info!("语言设置变更，重新翻译页面");
                self.cancel_timer();
                self.restore_page();
                self.schedule_scan(ScanKind::Full, self.settings.settle_delay());
            }
            _ => {}
        }
    }

    fn on_mutation(&mut self, nodes: Vec<Handle>) {
        if !self.is_enabled() {
            return;
        }

        let min_chars = self.settings.min_container_chars;
        let significant: Vec<Handle> = nodes
            .into_iter()
            .filter(|node| is_significant_addition(node, min_chars))
            .collect();
        if significant.is_empty() {
            return;
        }

        self.pending_nodes.extend(significant);

        // 已排期的全量扫描会覆盖新增节点
        if matches!(self.timer, Some(ScanTimer { kind: ScanKind::Full, .. })) {
            return;
        }
        self.schedule_scan(ScanKind::Incremental, self.settings.mutation_debounce());
    }

    fn schedule_scan(&mut self, kind: ScanKind, delay: Duration) {
        self.next_timer_id += 1;
        let timer = ScanTimer {
            id: self.next_timer_id,
            deadline: Instant::now() + delay,
            kind,
        };
        if let Some(previous) = self.timer.replace(timer) {
            tracing::trace!("取消计时器 {}", previous.id);
        }
        tracing::debug!("排期 {:?} 扫描 (计时器 {}, {:?} 后)", kind, timer.id, delay);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::debug!("取消计时器 {}", timer.id);
        }
    }

    /// 还原全部标记，并清空已处理集合与缓存
    fn restore_page(&mut self) {
        let markers = self.rewriter.restore(self.page.document());
        self.coordinator.clear_cache();
        self.pending_nodes.clear();
        tracing::info!("页面已还原 ({} 个标记)", markers);
        self.emit(StatusEvent::Restored { markers });
    }

    // ------------------------------------------------------------------------
    // 扫描
    // ------------------------------------------------------------------------

    /// 执行一次扫描，返回插入的标记数量
    async fn run_scan(&mut self, kind: ScanKind) -> usize {
        let Some(config) = self.config.clone() else {
            return 0;
        };

        let filter = match TextFilter::new(&config, &self.settings) {
            Ok(filter) => filter,
            Err(e) => {
                helpers::log_error(&e);
                return 0;
            }
        };

        let containers = {
            let scanner = TextScanner::new(&filter, &self.settings);
            match kind {
                ScanKind::Full => {
                    self.pending_nodes.clear();
                    scanner.find_containers(&self.page.scan_root(), self.rewriter.processed())
                }
                ScanKind::Incremental => {
                    let nodes = std::mem::take(&mut self.pending_nodes);
                    scanner.find_containers_in(&nodes, self.rewriter.processed())
                }
            }
        };

        self.state = ControllerState::Processing;
        let total = containers.len();
        tracing::info!("开始 {:?} 扫描: {} 个容器", kind, total);
        self.emit(StatusEvent::ScanStarted { total });

        let style = MarkerStyle::from_config(&config);
        let explicit_source = config.explicit_source_language().map(str::to_string);
        let target = config.target_language.clone();

        let mut deferred: Vec<PageEvent> = Vec::new();
        let mut rescan_requested = false;
        let mut cancelled = false;
        let mut translated = 0;

        for (index, container) in containers.iter().enumerate() {
            if let Interrupt::Cancel = self.drain_events(&mut deferred, &mut rescan_requested) {
                cancelled = true;
                break;
            }

            let tokens = filter.extract_tokens(&container.text);
            let language = self.coordinator.concrete_source_language(
                explicit_source.as_deref(),
                &config,
                &container.text,
            );
            let selector =
                WordSelector::new(config.translation_rate, config.translation_strategy, &language);

            let coordinator = &self.coordinator;
            let mut request =
                selector.select(&tokens, |t| coordinator.is_cached(t, &target), &mut self.rng);
            request.extend(
                tokens
                    .iter()
                    .filter(|t| coordinator.is_cached(t, &target))
                    .cloned(),
            );

            if request.is_empty() {
                self.rewriter.mark_processed(&container.element);
            } else {
                match self
                    .coordinator
                    .resolve(&request, explicit_source.as_deref(), &config, &container.text)
                    .await
                {
                    Ok(translations) => {
                        translated +=
                            self.rewriter
                                .apply(&container.element, &translations, &filter, &style);
                    }
                    Err(e) => {
                        // 容器保持未处理状态，下次扫描会再次尝试
                        helpers::log_error(&e);
                    }
                }
            }

            self.emit(StatusEvent::Progress {
                done: index + 1,
                total,
            });
        }

        if !cancelled {
            if let Interrupt::Cancel = self.drain_events(&mut deferred, &mut rescan_requested) {
                cancelled = true;
            }
        }

        self.state = ControllerState::Ready {
            enabled: config.enabled,
        };

        if cancelled {
            tracing::info!("扫描已中止，已插入 {} 个标记", translated);
            self.emit(StatusEvent::ScanCancelled);
        } else {
            tracing::info!("扫描完成，插入 {} 个标记", translated);
            self.emit(StatusEvent::ScanFinished { translated });
        }

        for event in deferred {
            self.dispatch(event).await;
        }

        if rescan_requested && !self.shutdown_requested && self.is_enabled() {
            self.schedule_scan(ScanKind::Full, Duration::ZERO);
        }

        translated
    }

    /// 取出扫描期间到达的事件
    fn drain_events(&mut self, deferred: &mut Vec<PageEvent>, rescan_requested: &mut bool) -> Interrupt {
        let mut interrupt = Interrupt::None;

        while let Ok(event) = self.events.try_recv() {
            match &event {
                PageEvent::Control(ControlMessage::ConfigUpdated(config)) => {
                    let excluded = self
                        .page
                        .hostname()
                        .map(|h| config.is_site_excluded(h))
                        .unwrap_or(false);
                    if !config.enabled || excluded {
                        interrupt = Interrupt::Cancel;
                    }
                    deferred.push(event);
                }
                PageEvent::Control(ControlMessage::ForceRestore) => {
                    interrupt = Interrupt::Cancel;
                    deferred.push(event);
                }
                PageEvent::Control(ControlMessage::ForceReprocess) => {
                    *rescan_requested = true;
                }
                PageEvent::Shutdown => {
                    self.shutdown_requested = true;
                    return Interrupt::Cancel;
                }
                _ => deferred.push(event),
            }
        }

        interrupt
    }

    // ------------------------------------------------------------------------
    // 划词翻译
    // ------------------------------------------------------------------------

    async fn translate_selection(
        &mut self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> SelectionOutcome {
        let outcome = match &self.config {
            None => SelectionOutcome::Failed {
                notice: "翻译功能尚未就绪".to_string(),
            },
            Some(config) => {
                match self
                    .coordinator
                    .translate_text(text, source_lang, target_lang, config)
                    .await
                {
                    Ok(translation) => SelectionOutcome::Translated {
                        original: text.trim().to_string(),
                        translation,
                    },
                    Err(e) => {
                        tracing::warn!("划词翻译失败: {}", e);
                        SelectionOutcome::Failed {
                            notice: "无法翻译所选文本，请稍后重试".to_string(),
                        }
                    }
                }
            }
        };

        let message = match &outcome {
            SelectionOutcome::Translated {
                original,
                translation,
            } => format!("{} → {}", original, translation),
            SelectionOutcome::Failed { notice } => notice.clone(),
        };
        self.emit(StatusEvent::Notice { message });

        outcome
    }
}

/// 新增节点是否带来了足够的新文本
fn is_significant_addition(node: &Handle, min_chars: usize) -> bool {
    if is_marker(node) || !is_attached(node) {
        return false;
    }

    match node.data {
        NodeData::Element { .. } | NodeData::Text { .. } => {
            text_content(node).trim().chars().count() >= min_chars
        }
        _ => false,
    }
}
