//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Route panic reports through tracing
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - JSON format for production, pretty format for development

use std::any::Any;
use std::backtrace::Backtrace;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("capybara_api={level},tower_http={level}", level = config.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    install_panic_hook(config.stack_trace);
}

/// Replace the default panic hook with one that logs through tracing,
/// optionally with a backtrace of the panicking thread.
pub fn install_panic_hook(stack_trace: bool) {
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        if stack_trace {
            let backtrace = Backtrace::force_capture();
            tracing::error!(%location, panic = %message, backtrace = %backtrace, "Panic");
        } else {
            tracing::error!(%location, panic = %message, "Panic");
        }
    }));
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
