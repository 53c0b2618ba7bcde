// Concurrent enumeration engine for qsfuzz
// Uses a tokio JoinSet to keep up to `workers` URLs in flight and streams each
// URL's injections to the consumer over an mpsc channel as soon as it is ready

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

use crate::config::FuzzConfig;
use crate::enumerator::{enumerate, RenderMode};
use crate::models::Injection;

pub struct EnumerationEngine {
    config: Arc<FuzzConfig>,
    mode: RenderMode,
    workers: usize,
}

impl EnumerationEngine {
    pub fn new(config: FuzzConfig, mode: RenderMode, workers: usize) -> Self {
        Self {
            config: Arc::new(config),
            mode,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start enumerating every rule against every URL in the background.
    ///
    /// The receiver yields one batch of injections per source URL, in input order.
    /// A URL that cannot be enumerated yields no batch. Dropping the receiver
    /// stops the dispatcher.
    pub fn stream(&self, urls: Vec<String>) -> mpsc::Receiver<Vec<Injection>> {
        let (tx, rx) = mpsc::channel(self.workers);
        let config = Arc::clone(&self.config);
        let mode = self.mode;
        let workers = self.workers;
        tokio::spawn(async move {
            dispatch(urls, config, mode, workers, tx).await;
        });
        rx
    }

    /// Collect every batch from `stream` into one list.
    pub async fn run(&self, urls: Vec<String>) -> Vec<Injection> {
        let mut rx = self.stream(urls);
        let mut injections = Vec::new();
        while let Some(batch) = rx.recv().await {
            injections.extend(batch);
        }
        injections
    }
}

async fn dispatch(
    urls: Vec<String>,
    config: Arc<FuzzConfig>,
    mode: RenderMode,
    workers: usize,
    tx: mpsc::Sender<Vec<Injection>>,
) {
    let mut pending = urls.into_iter().enumerate();
    let mut join_set = JoinSet::new();
    // Finished batches waiting for an earlier position to complete
    let mut ready: BTreeMap<usize, Vec<Injection>> = BTreeMap::new();
    let mut next = 0usize;

    loop {
        while join_set.len() < workers {
            let Some((position, raw)) = pending.next() else {
                break;
            };
            let config = Arc::clone(&config);
            join_set.spawn_blocking(move || (position, inject_url(&raw, &config, mode)));
        }

        match join_set.join_next().await {
            Some(Ok((position, injections))) => {
                ready.insert(position, injections);
            }
            Some(Err(e)) => tracing::warn!("enumeration worker failed: {}", e),
            None => break,
        }

        while let Some(batch) = ready.remove(&next) {
            next += 1;
            if !send_batch(&tx, batch).await {
                return;
            }
        }
    }

    // Only non-empty if a worker failed and left a gap in the positions
    for (_, batch) in ready {
        if !send_batch(&tx, batch).await {
            return;
        }
    }
}

/// Returns false once the consumer has gone away.
async fn send_batch(tx: &mpsc::Sender<Vec<Injection>>, batch: Vec<Injection>) -> bool {
    if batch.is_empty() {
        return true;
    }
    tx.send(batch).await.is_ok()
}

/// Enumerate all rules for a single URL.
pub fn inject_url(raw: &str, config: &FuzzConfig, mode: RenderMode) -> Vec<Injection> {
    let url = match Url::parse(raw) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("skipping {}: {}", raw, e);
            return Vec::new();
        }
    };

    let mut injections = Vec::new();
    for (rule_name, rule) in &config.rules {
        match enumerate(&url, rule.injections.as_slice(), mode) {
            Ok(candidates) => {
                tracing::debug!("{}: {} candidates for {}", rule_name, candidates.len(), raw);
                injections.extend(candidates.into_iter().map(|candidate| Injection {
                    rule: rule_name.clone(),
                    source: raw.to_string(),
                    candidate,
                }));
            }
            Err(e) => {
                tracing::warn!("skipping {}: error parsing query: {}", raw, e);
                return Vec::new();
            }
        }
    }
    injections
}
