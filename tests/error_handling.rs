//! 错误处理集成测试
//!
//! 提供者失败、备用提供者、超时与错误分类

use std::time::Duration;

use async_trait::async_trait;

use wordweave::translation::{
    ErrorCategory, ErrorSeverity, PipelineSettings, SelectionOutcome, StaticConfigSource,
    StatusEvent, TranslationCoordinator, TranslationError, TranslationGateway, TranslationProvider,
    TranslationResult,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{enabled_config, spanish_dictionary, CountingProvider, FailingProvider, TestEnvironment};

/// 永远不返回的提供者
struct HangingProvider;

#[async_trait(?Send)]
impl TranslationProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn translate(&self, _: &str, _: &str, _: &str) -> TranslationResult<String> {
        std::future::pending().await
    }
}

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_all_failures_report_batch_failed() {
    let settings = PipelineSettings::default();
    let gateway = TranslationGateway::new(&settings).with_provider(FailingProvider);
    let mut coordinator = TranslationCoordinator::new(gateway, &settings);

    let result = coordinator
        .resolve(&tokens(&["cat", "dog", "cat"]), Some("en"), &enabled_config(), "")
        .await;

    assert_eq!(result, Err(TranslationError::BatchFailed { attempted: 2 }));
    assert!(coordinator.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fallback_provider_is_used() {
    let backup = CountingProvider::new(spanish_dictionary());
    let calls = backup.calls.clone();
    let settings = PipelineSettings::default();
    let gateway = TranslationGateway::new(&settings)
        .with_provider(FailingProvider)
        .with_provider(backup);
    let mut coordinator = TranslationCoordinator::new(gateway, &settings);

    let result = coordinator
        .resolve(&tokens(&["cat"]), Some("en"), &enabled_config(), "")
        .await
        .unwrap();

    assert_eq!(result.get("cat").map(String::as_str), Some("gato"));
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_provider_times_out_then_falls_back() {
    let settings = PipelineSettings {
        provider_timeout_ms: 500,
        ..PipelineSettings::default()
    };
    let gateway = TranslationGateway::new(&settings)
        .with_provider(HangingProvider)
        .with_provider(spanish_dictionary());
    let start = tokio::time::Instant::now();

    let translated = gateway.translate("dog", "en", "es").await.unwrap();

    assert_eq!(translated, "perro");
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_empty_gateway_has_no_providers() {
    let gateway = TranslationGateway::default();
    let err = gateway.translate("cat", "en", "es").await.unwrap_err();

    assert_eq!(err, TranslationError::NoProviders);
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(err.severity(), ErrorSeverity::Critical);
    assert!(!err.is_retryable());
}

#[test]
fn test_error_classification() {
    let network = TranslationError::NetworkError("connection reset".to_string());
    assert!(network.is_retryable());
    assert_eq!(network.category(), ErrorCategory::Network);

    let batch = TranslationError::BatchFailed { attempted: 3 };
    assert_eq!(batch.severity(), ErrorSeverity::Error);
    assert!(batch.to_string().contains('3'));

    let with_context = TranslationError::TimeoutError("10s".to_string()).with_context("deeplx");
    assert!(with_context.to_string().contains("deeplx"));
    assert_eq!(with_context.category(), ErrorCategory::Timeout);
}

/// 页面翻译失败时不改写页面，选区翻译返回提示
#[tokio::test(start_paused = true)]
async fn test_failures_surface_as_notices() {
    let html = "<html><body><p>The quick brown fox jumps over the lazy dog.</p></body></html>";
    let mut env = TestEnvironment::with_provider(html, FailingProvider);

    env.controller
        .initialize(&StaticConfigSource::new(enabled_config()))
        .await;
    env.handle.force_reprocess().unwrap();
    env.controller.process_pending_events().await;

    assert_eq!(env.markers(), 0);
    let events = env.drain_status();
    assert!(events.contains(&StatusEvent::ScanFinished { translated: 0 }));

    let TestEnvironment {
        mut controller,
        handle,
        mut status,
        ..
    } = env;
    let source = StaticConfigSource::new(enabled_config());
    let driver = controller.run(&source);
    let script = async {
        let outcome = handle.translate_text("fox", None, None).await.unwrap();
        assert!(matches!(outcome, SelectionOutcome::Failed { .. }));
        handle.shutdown().unwrap();
    };
    tokio::join!(driver, script);

    let mut notices = 0;
    while let Ok(event) = status.try_recv() {
        if let StatusEvent::Notice { .. } = event {
            notices += 1;
        }
    }
    assert_eq!(notices, 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = wordweave::ExtensionConfig {
        target_language: "spanish".to_string(),
        ..enabled_config()
    };
    assert!(matches!(config.validate(), Err(TranslationError::ConfigError(_))));

    let settings = PipelineSettings {
        max_in_flight_requests: 0,
        ..PipelineSettings::default()
    };
    assert!(settings.validate().is_err());
}
