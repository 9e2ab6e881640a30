//! OpenTelemetry bridge tests

use logwrap::otel::{with_otel_context, OtelHook};
use logwrap::prelude::*;
use opentelemetry::logs::{AnyValue, Severity};
use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};

fn pipeline() -> (SdkLoggerProvider, InMemoryLogExporter) {
    let exporter = InMemoryLogExporter::default();
    let provider = SdkLoggerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (provider, exporter)
}

fn bridged(provider: &SdkLoggerProvider, level: LogLevel) -> Logger {
    Logger::builder()
        .min_level(level)
        .build()
        .with_hook(OtelHook::with_provider(provider, "checkout"))
}

#[test]
fn test_records_carry_body_and_severity() {
    let (provider, exporter) = pipeline();
    let logger = bridged(&provider, LogLevel::Trace);

    logger.info("order placed");
    logger.panic("invariant broken");

    let logs = exporter.get_emitted_logs().expect("exporter readable");
    assert_eq!(logs.len(), 2);

    let first = &logs[0].record;
    assert_eq!(first.body(), Some(&AnyValue::from("order placed".to_string())));
    assert_eq!(first.severity_number(), Some(Severity::Info));
    assert_eq!(first.severity_text(), Some("info"));

    let second = &logs[1].record;
    assert_eq!(second.severity_number(), Some(Severity::Fatal4));
    assert_eq!(second.severity_text(), Some("panic"));
}

#[test]
fn test_filtered_entries_are_not_bridged() {
    let (provider, exporter) = pipeline();
    let logger = bridged(&provider, LogLevel::Warn);

    logger.debug("too quiet");
    logger.error("loud enough");

    let logs = exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].record.severity_number(), Some(Severity::Error));
}

#[test]
fn test_fields_become_attributes() {
    let (provider, exporter) = pipeline();
    let logger = bridged(&provider, LogLevel::Info).with_field("order_id", 991);

    logger.event(LogLevel::Warn).field("retry", true).msg("slow payment");

    let logs = exporter.get_emitted_logs().unwrap();
    let attributes: Vec<_> = logs[0]
        .record
        .attributes_iter()
        .map(|(key, value)| (key.as_str().to_string(), value.clone()))
        .collect();

    assert!(attributes.contains(&("order_id".to_string(), AnyValue::from(991i64))));
    assert!(attributes.contains(&("retry".to_string(), AnyValue::from(true))));
}

#[test]
fn test_entries_emitted_under_context() {
    let (provider, exporter) = pipeline();
    let logger = bridged(&provider, LogLevel::Info);

    let ctx = with_otel_context(&Context::background(), opentelemetry::Context::new());
    let ctx = with_ctx(&ctx, logger);
    from_ctx(&ctx).event(LogLevel::Info).ctx(&ctx).msg("with context");

    assert_eq!(exporter.get_emitted_logs().unwrap().len(), 1);
}

#[test]
fn test_disabled_hook_emits_nothing() {
    let (_provider, exporter) = pipeline();
    let logger = Logger::builder().build().with_hook(OtelHook::disabled());

    logger.error("not exported");

    assert!(exporter.get_emitted_logs().unwrap().is_empty());
}
