use cfg_if::cfg_if;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console and capture panics with a
        /// stack trace.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        // Keeps the non-blocking writer flushing for the process lifetime
        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Tracing to stderr plus a daily rolling file. `RUST_LOG` filters,
        /// `RUST_LOG_FILE` overrides the log path (default logs/skirmish.log).
        pub fn init() {
            let log_path = std::env::var("RUST_LOG_FILE")
                .unwrap_or_else(|_| "logs/skirmish.log".to_string());
            let path = std::path::Path::new(&log_path);
            let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
                path.parent().unwrap_or(std::path::Path::new(".")),
                path.file_name().unwrap_or(std::ffi::OsStr::new("skirmish.log")),
            ));
            let _ = FILE_GUARD.set(guard);

            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .init();

            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() {
                    msg.push_str(s);
                } else if let Some(s) = info.payload().downcast_ref::<String>() {
                    msg.push_str(s);
                } else {
                    msg.push_str("<non-string panic>");
                }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));
        }
    }
}
