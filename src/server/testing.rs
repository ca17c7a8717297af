//! In-memory transport used by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AuditError, Result};

use super::transport::Transport;

enum Reply {
    Body(Vec<u8>),
    Timeout,
}

struct Route {
    reply: Reply,
    delay: Duration,
}

/// Serves canned bodies per URL, with optional latency and timeouts.
/// Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.with_delayed_body(url, body, Duration::ZERO)
    }

    pub fn with_delayed_body(mut self, url: &str, body: &str, delay: Duration) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                reply: Reply::Body(body.as_bytes().to_vec()),
                delay,
            },
        );
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                reply: Reply::Timeout,
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = match self.routes.get(url) {
            Some(route) => {
                if !route.delay.is_zero() {
                    tokio::time::sleep(route.delay).await;
                }
                match &route.reply {
                    Reply::Body(body) => Ok(body.clone()),
                    Reply::Timeout => Err(AuditError::Timeout {
                        url: url.to_string(),
                    }),
                }
            }
            None => Err(AuditError::Status {
                url: url.to_string(),
                status: 404,
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
