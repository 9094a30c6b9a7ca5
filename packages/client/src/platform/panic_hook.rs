//! Panic capture for the last-known-exception attachment

use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;

use super::store::{LAST_KNOWN_EXCEPTION_KEY, PreferenceStore};

/// Record every panic in `store` under the reserved key, then run the
/// previously installed hook.
pub fn install_panic_hook(store: Arc<PreferenceStore>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let report = describe_panic(info, &Backtrace::force_capture());
        match store.try_set(LAST_KNOWN_EXCEPTION_KEY, report) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Preference store busy; panic report dropped"),
            Err(e) => tracing::warn!("Failed to persist panic report: {}", e),
        }
        previous(info);
    }));
}

fn describe_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> String {
    let payload = info.payload();
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    };

    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "unknown location".to_string());

    format!("thread '{thread_name}' panicked at {location}:\n{message}\n{backtrace}")
}
