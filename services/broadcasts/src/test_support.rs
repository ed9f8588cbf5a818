//! In-memory broadcast source for tests

use std::sync::Mutex;

use async_trait::async_trait;
use common::{BroadcastBatch, BroadcastItem, BroadcastSource, UpstreamError, UpstreamResult};
use serde_json::{Value, json};

pub fn broadcast(username: &str, viewers: u64) -> BroadcastItem {
    BroadcastItem {
        id: format!("id-{username}"),
        username: username.to_string(),
        country: "BR".to_string(),
        gender: "male".to_string(),
        viewers,
        ..BroadcastItem::default()
    }
}

/// Serves `items` in batches and records every requested offset
pub struct FakeSource {
    items: Vec<BroadcastItem>,
    /// Total reported by each successive call, the last one repeating
    totals: Vec<u64>,
    fail_at: Option<u64>,
    offsets: Mutex<Vec<u64>>,
}

impl FakeSource {
    pub fn new(items: Vec<BroadcastItem>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            totals: vec![total],
            fail_at: None,
            offsets: Mutex::new(Vec::new()),
        }
    }

    pub fn with_totals(mut self, totals: Vec<u64>) -> Self {
        self.totals = totals;
        self
    }

    /// Fail the batch requested at `offset`
    pub fn failing_at(mut self, offset: u64) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }

    fn known(&self, username: &str) -> bool {
        self.items.iter().any(|item| item.username == username)
    }
}

#[async_trait]
impl BroadcastSource for FakeSource {
    async fn fetch_batch(&self, offset: u64, limit: u64) -> UpstreamResult<BroadcastBatch> {
        let call = {
            let mut offsets = self.offsets.lock().unwrap();
            offsets.push(offset);
            offsets.len() - 1
        };

        if self.fail_at == Some(offset) {
            return Err(UpstreamError::Api {
                message: "connection reset by peer".to_string(),
            });
        }

        let total = self.totals[call.min(self.totals.len() - 1)];
        let items = self
            .items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(BroadcastBatch { total, items })
    }

    async fn fetch_profile(&self, username: &str) -> UpstreamResult<Value> {
        if self.known(username) {
            Ok(json!({ "username": username, "age": 30 }))
        } else {
            Err(UpstreamError::Status {
                status: 404,
                url: format!("http://upstream/profile/{username}/info"),
            })
        }
    }

    async fn fetch_stream_info(&self, username: &str) -> UpstreamResult<Value> {
        if username == "offline" {
            return Err(UpstreamError::Status {
                status: 500,
                url: format!("http://upstream/profile/{username}/streamInfo"),
            });
        }
        Ok(json!({ "cdnURL": format!("https://cdn/{username}.m3u8") }))
    }
}
