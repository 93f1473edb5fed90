//! Bulk scans over a scroll cursor.

use tracing::debug;

use super::backend::{ScanRequest, SearchBackend, SearchHit};
use crate::error::EvidenceResult;

enum ScanState {
    Pending(ScanRequest),
    Open { scroll_id: String, keep_alive: String },
    Done,
}

/// A lazy, finite, non-restartable iteration over every hit of a scan.
///
/// Batches are pulled with [`HitScanner::next_batch`]. The cursor is released
/// when the scan is exhausted or when the caller calls [`HitScanner::abandon`].
/// Once exhausted the scanner keeps returning `None`.
pub struct HitScanner<'a, B: SearchBackend + ?Sized> {
    backend: &'a B,
    state: ScanState,
    total: u64,
    seen: u64,
}

impl<'a, B: SearchBackend + ?Sized> HitScanner<'a, B> {
    /// Prepares a scan; nothing is sent until the first batch is pulled.
    pub fn new(backend: &'a B, request: ScanRequest) -> Self {
        Self {
            backend,
            state: ScanState::Pending(request),
            total: 0,
            seen: 0,
        }
    }

    /// Total reported by the backend, known after the first batch.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of hits handed out so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Fetches the next non-empty batch, or `None` once the scan is drained.
    pub async fn next_batch(&mut self) -> EvidenceResult<Option<Vec<SearchHit>>> {
        let (page, keep_alive) = match std::mem::replace(&mut self.state, ScanState::Done) {
            ScanState::Done => return Ok(None),
            ScanState::Pending(request) => {
                let page = self.backend.open_scroll(&request).await?;
                self.total = page.total;
                (page, request.keep_alive)
            }
            ScanState::Open {
                scroll_id,
                keep_alive,
            } => match self.backend.next_scroll(&scroll_id, &keep_alive).await {
                Ok(page) => (page, keep_alive),
                Err(err) => {
                    // Release the cursor but report the original failure.
                    let _ = self.backend.clear_scroll(&scroll_id).await;
                    return Err(err);
                }
            },
        };

        if page.hits.is_empty() {
            if let Some(scroll_id) = page.scroll_id {
                self.backend.clear_scroll(&scroll_id).await?;
            }
            debug!(total = self.total, seen = self.seen, "Scan drained");
            return Ok(None);
        }

        if let Some(scroll_id) = page.scroll_id {
            self.state = ScanState::Open {
                scroll_id,
                keep_alive,
            };
        }
        self.seen += page.hits.len() as u64;
        Ok(Some(page.hits))
    }

    /// Stops the scan early and releases the cursor.
    pub async fn abandon(mut self) -> EvidenceResult<()> {
        if let ScanState::Open { scroll_id, .. } =
            std::mem::replace(&mut self.state, ScanState::Done)
        {
            self.backend.clear_scroll(&scroll_id).await?;
        }
        Ok(())
    }
}
