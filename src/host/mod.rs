//! Editor host capabilities consumed by the logger
//!
//! The host owns output panels and tears down registered resources when the
//! extension deactivates. `MemoryHost` implements it in-process.

mod channel;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::logging::SinkError;

pub use channel::{MemoryChannel, MemoryHost, DEFAULT_PANEL_CAPACITY};

/// A resource released when the extension is torn down
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

/// A persistent, user-visible text panel owned by the host
pub trait OutputChannel: Disposable {
    /// Panel title
    fn name(&self) -> &str;

    /// Append one line to the panel
    fn append_line(&self, line: &str) -> Result<(), SinkError>;
}

/// Host application API used to create output panels
pub trait Host: Send + Sync {
    fn create_output_channel(&self, name: &str) -> Arc<dyn OutputChannel>;
}

/// Extension lifecycle handle: install path plus teardown subscriptions
pub struct ExtensionContext {
    extension_path: PathBuf,
    subscriptions: Mutex<Vec<Arc<dyn Disposable>>>,
}

impl ExtensionContext {
    pub fn new(extension_path: impl Into<PathBuf>) -> Self {
        Self {
            extension_path: extension_path.into(),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Directory the extension is installed in
    pub fn extension_path(&self) -> &Path {
        &self.extension_path
    }

    /// Register a resource for teardown
    pub fn push_subscription(&self, resource: Arc<dyn Disposable>) {
        let mut subscriptions = match self.subscriptions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscriptions.push(resource);
    }

    /// Number of registered resources
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Dispose every registered resource, most recent first
    pub fn dispose_subscriptions(&self) {
        let drained: Vec<Arc<dyn Disposable>> = match self.subscriptions.lock() {
            Ok(mut guard) => guard.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for resource in drained.into_iter().rev() {
            resource.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted {
        order: Arc<Mutex<Vec<usize>>>,
        id: usize,
        disposed: AtomicUsize,
    }

    impl Disposable for Counted {
        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.id);
        }
    }

    #[test]
    fn test_context_keeps_path() {
        let context = ExtensionContext::new("/ext/hero");
        assert_eq!(context.extension_path(), Path::new("/ext/hero"));
        assert_eq!(context.subscription_count(), 0);
    }

    #[test]
    fn test_dispose_in_reverse_order_once() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::new(Counted {
            order: Arc::clone(&order),
            id: 1,
            disposed: AtomicUsize::new(0),
        });
        let second = Arc::new(Counted {
            order: Arc::clone(&order),
            id: 2,
            disposed: AtomicUsize::new(0),
        });

        let context = ExtensionContext::new("/ext");
        context.push_subscription(first.clone());
        context.push_subscription(second.clone());
        assert_eq!(context.subscription_count(), 2);

        context.dispose_subscriptions();
        context.dispose_subscriptions();

        assert_eq!(*order.lock().unwrap(), vec![2, 1]);
        assert_eq!(first.disposed.load(Ordering::SeqCst), 1);
        assert_eq!(context.subscription_count(), 0);
    }
}
