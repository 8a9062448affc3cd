use std::collections::HashMap;
use std::sync::Arc;

use common::{TraceId, root_span};
use parking_lot::RwLock;
use tracing::{Instrument, Span, debug, error, info, warn};

use crate::types::{ItemId, UNKNOWN_ITEM_NAME};
use crate::wiki::{MappingEntry, WikiApi, WikiError, parse_mapping};

/// Item id -> display name, loaded in bulk from the wiki mapping endpoint.
///
/// Each successful `load` swaps in a fresh map; a failed one keeps the
/// previous map untouched.
pub struct ItemNameDirectory<A: WikiApi> {
    api: Arc<A>,
    names: RwLock<HashMap<ItemId, Arc<str>>>,
    unknown: Arc<str>,
}

impl<A: WikiApi> ItemNameDirectory<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            names: RwLock::new(HashMap::new()),
            unknown: Arc::from(UNKNOWN_ITEM_NAME),
        }
    }

    /// Fetch the mapping and replace the directory.
    ///
    /// Returns the number of names now held, or `None` if the load failed
    /// and the previous mapping was kept.
    pub async fn load(&self) -> Option<usize> {
        let trace_id = TraceId::default();
        let span = root_span("name_directory_load", &trace_id);

        async {
            match self.try_load().await {
                Ok(count) => {
                    Span::current().record("item_count", count);
                    info!(count, "item name mapping loaded");
                    Some(count)
                }
                Err(e) if e.is_transport() => {
                    error!(error = %e, "failed to fetch item name mapping");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "item name mapping rejected; keeping previous names");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_load(&self) -> Result<usize, WikiError> {
        let body = self.api.fetch_mapping().await?;
        let elements = parse_mapping(&body)?;

        let mut fresh = HashMap::with_capacity(elements.len());
        let mut skipped = 0usize;

        for element in elements {
            match serde_json::from_value::<MappingEntry>(element) {
                Ok(entry) => {
                    fresh.insert(ItemId(entry.id), Arc::from(entry.name));
                }
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "skipping malformed mapping element");
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "mapping elements skipped");
        }

        let count = fresh.len();
        *self.names.write() = fresh;

        Ok(count)
    }

    /// Display name for `id`, or `"Unknown Item"`.
    pub fn name_for(&self, id: ItemId) -> Arc<str> {
        self.names
            .read()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.unknown))
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}
