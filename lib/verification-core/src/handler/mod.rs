use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

/// A long-running consumer of broker events.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Receive loop. Implementations retry failed subscriptions forever and
    /// only return when the surrounding task is aborted.
    async fn listen(&self);

    /// Release held resources before shutdown.
    async fn close(&self) {}

    fn alive(&self) -> bool;
}

/// Supervises the registered handlers, one task each.
#[derive(Default)]
pub struct EventHandlerSet {
    handlers: Vec<Arc<dyn EventHandler>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EventHandlerSet {
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn start(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for handler in &self.handlers {
            let handler = handler.clone();
            tracing::info!(handler = handler.name(), "starting event handler");
            tasks.push(tokio::spawn(async move { handler.listen().await }));
        }
    }

    pub async fn stop(&self) {
        let tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        for task in tasks {
            task.abort();
        }
        for handler in &self.handlers {
            handler.close().await;
        }
    }

    /// Liveness is the conjunction over all handlers.
    pub fn alive(&self) -> bool {
        self.handlers.iter().all(|handler| handler.alive())
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct StubHandler {
        alive: bool,
        listened: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl EventHandler for StubHandler {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn listen(&self) {
            self.listened.store(true, Ordering::SeqCst);
            std::future::pending::<()>().await;
        }

        fn alive(&self) -> bool {
            self.alive
        }
    }

    #[tokio::test]
    async fn start_runs_every_handler() {
        let listened = Arc::new(AtomicBool::new(false));
        let mut set = EventHandlerSet::default();
        set.register(Arc::new(StubHandler {
            alive: true,
            listened: listened.clone(),
        }));

        set.start();
        tokio::task::yield_now().await;

        assert!(listened.load(Ordering::SeqCst));
        set.stop().await;
    }

    #[tokio::test]
    async fn alive_is_the_conjunction_of_all_handlers() {
        let mut set = EventHandlerSet::default();
        assert!(set.alive());

        set.register(Arc::new(StubHandler {
            alive: true,
            listened: Arc::new(AtomicBool::new(false)),
        }));
        assert!(set.alive());

        set.register(Arc::new(StubHandler {
            alive: false,
            listened: Arc::new(AtomicBool::new(false)),
        }));
        assert!(!set.alive());
    }
}
