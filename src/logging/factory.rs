//! Logger factory
//!
//! Picks the sinks for the current environment and wires them into a `Logger`.
//! The console sink always exists. In an interactive editor session the factory
//! also creates the output panel and the rotating log file, and routes uncaught
//! exceptions to the file.

use std::sync::Arc;

use crate::config::{EnvFlags, LoggerConfig};
use crate::host::{ExtensionContext, Host};

use super::console::ConsoleSink;
use super::exceptions::ExceptionHandler;
use super::file_writer::FileSink;
use super::level::Level;
use super::logger::Logger;
use super::panel::PanelSink;
use super::rotation::cleanup_stale_backups;
use super::sink::Sink;

/// Explicitly owned list of active sinks
pub struct SinkRegistry {
    sinks: Vec<Arc<dyn Sink>>,
}

impl SinkRegistry {
    /// Start a registry holding only the console sink
    pub fn new(console: Arc<dyn Sink>) -> Self {
        Self {
            sinks: vec![console],
        }
    }

    pub fn push(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Snapshot of the registered sinks
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.clone()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

pub struct LoggerFactory {
    env: EnvFlags,
    config: LoggerConfig,
    registry: SinkRegistry,
    exceptions: Arc<ExceptionHandler>,
    install_panic_hook: bool,
    interactive_wired: bool,
}

impl LoggerFactory {
    /// Factory whose console sink writes to the process stdio
    pub fn new(env: EnvFlags, config: LoggerConfig) -> Self {
        let console = ConsoleSink::stdio(env.console_level());
        Self::with_console(env, config, console)
    }

    /// Factory with a caller-provided console sink
    pub fn with_console(env: EnvFlags, config: LoggerConfig, console: ConsoleSink) -> Self {
        Self {
            env,
            config,
            registry: SinkRegistry::new(Arc::new(console)),
            exceptions: ExceptionHandler::new(),
            install_panic_hook: true,
            interactive_wired: false,
        }
    }

    /// Record exceptions only through [`ExceptionHandler::record`]; leave the
    /// process panic hook alone
    pub fn without_panic_hook(mut self) -> Self {
        self.install_panic_hook = false;
        self
    }

    pub fn env(&self) -> EnvFlags {
        self.env
    }

    pub fn registry(&self) -> &SinkRegistry {
        &self.registry
    }

    /// Receiver of uncaught-exception records
    pub fn exceptions(&self) -> &Arc<ExceptionHandler> {
        &self.exceptions
    }

    /// Build a logger for the requested verbosity
    ///
    /// The file and panel sinks are created by the first interactive call only;
    /// later loggers from the same factory share them through the registry.
    pub fn create(
        &mut self,
        verbosity: Level,
        context: &ExtensionContext,
        host: &dyn Host,
    ) -> Logger {
        let level = self.env.effective_level(verbosity);

        if self.env.is_interactive() && !self.interactive_wired {
            self.interactive_wired = true;

            let channel = host.create_output_channel(&self.config.channel_name);
            let panel = Arc::new(PanelSink::new(channel));
            context.push_subscription(panel.clone());

            let file = Arc::new(FileSink::new(
                self.env.file_level(level),
                context.extension_path(),
                &self.config.file_name,
                self.config.file_options(),
            ));
            // Leftovers from a larger backup count are not worth failing over
            let _ = cleanup_stale_backups(file.path(), self.config.max_files);

            self.exceptions.handle(file.clone());
            if self.install_panic_hook {
                self.exceptions.install();
            }

            self.registry.push(file);
            self.registry.push(panel);
        }

        Logger::new(level, self.registry.sinks())
    }
}
