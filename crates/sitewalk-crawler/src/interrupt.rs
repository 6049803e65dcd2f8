use std::sync::Arc;

use futures::future;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cancellation flag shared between the crawl loop and whoever stops it.
///
/// Once triggered it stays triggered.
#[derive(Debug, Clone)]
pub struct Interrupt {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt has been triggered
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stop| *stop).await.is_err() {
            future::pending::<()>().await;
        }
    }

    /// Triggers on the first SIGINT received by the process
    pub fn listen_ctrl_c(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::warn!("Interrupted, stopping crawl and saving progress");
                    interrupt.trigger();
                }
                Err(e) => log::error!("Couldn't listen for SIGINT: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn trigger_is_seen_by_clones() {
        let interrupt = Interrupt::new();
        let other = interrupt.clone();
        assert!(!other.is_triggered());

        interrupt.trigger();
        assert!(other.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), other.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn untriggered_never_resolves() {
        let interrupt = Interrupt::new();
        let res = tokio::time::timeout(Duration::from_millis(20), interrupt.triggered()).await;
        assert!(res.is_err());
    }
}
