use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use market::{WikiApi, WikiError};

/// Serves fixed bodies; `None` answers with a 503.
#[derive(Default)]
pub struct MockWiki {
    pub latest: Mutex<Option<String>>,
    pub mapping: Mutex<Option<String>>,
    pub latest_calls: AtomicUsize,
    pub mapping_calls: AtomicUsize,
}

impl MockWiki {
    pub fn new(latest: &str, mapping: &str) -> Self {
        Self {
            latest: Mutex::new(Some(latest.to_string())),
            mapping: Mutex::new(Some(mapping.to_string())),
            ..Self::default()
        }
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn mapping_calls(&self) -> usize {
        self.mapping_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WikiApi for MockWiki {
    async fn fetch_latest(&self) -> Result<String, WikiError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.latest.lock().clone();
        body.ok_or(WikiError::Status(503))
    }

    async fn fetch_mapping(&self) -> Result<String, WikiError> {
        self.mapping_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.mapping.lock().clone();
        body.ok_or(WikiError::Status(503))
    }
}
