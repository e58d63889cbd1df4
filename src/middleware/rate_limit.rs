// src/middleware/rate_limit.rs
//
// Per-IP fixed-window rate limiting.
//
// Each client IP gets `limit` requests per window. A background task evicts
// clients that have been quiet for longer than the client timeout.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const WINDOW: Duration = Duration::from_secs(60);
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Request count inside the current window of one client.
#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    started: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    client_timeout: Duration,
    trust_proxy_headers: bool,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl RateLimiter {
    pub fn new(limit: u32, trust_proxy_headers: bool) -> Self {
        Self {
            limit,
            window: WINDOW,
            client_timeout: CLIENT_TIMEOUT,
            trust_proxy_headers,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request from `client` at `now`; false once the window is used up.
    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Rate limit state was poisoned, recovering");
            poisoned.into_inner()
        });

        match clients.get_mut(client) {
            Some(entry) if now.saturating_duration_since(entry.started) <= self.window => {
                if entry.count < self.limit {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
            // New client, or the previous window has ended
            _ => {
                clients.insert(
                    client.to_string(),
                    ClientWindow {
                        count: 1,
                        started: now,
                    },
                );
                true
            }
        }
    }

    /// Drops clients whose window started more than the client timeout ago.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = clients.len();
        let timeout = self.client_timeout;
        clients.retain(|_, entry| now.saturating_duration_since(entry.started) <= timeout);
        before - clients.len()
    }

    /// Runs `sweep_at` every `CLEANUP_INTERVAL` until the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = weak.upgrade() else {
                    break;
                };
                let removed = limiter.sweep_at(Instant::now());
                if removed > 0 {
                    tracing::debug!("Evicted {} idle rate limit entries", removed);
                }
            }
        });
    }

    /// Client key: first X-Forwarded-For entry, then X-Real-IP (proxy headers
    /// only when trusted), then the TCP peer, then "unknown".
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.trust_proxy_headers {
            let forwarded = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(ip) = forwarded {
                return ip.to_string();
            }

            let real_ip = headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(ip) = real_ip {
                return ip.to_string();
            }
        }

        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Axum Middleware: rejects clients over their budget with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = limiter.client_key(req.headers(), peer);

    if !limiter.check_at(&client, Instant::now()) {
        tracing::warn!("Rate limit exceeded for {}", client);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, WINDOW.as_secs().to_string())],
            axum::Json(json!({ "error": "Too many requests" })),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn allows_up_to_limit_per_window() {
        let limiter = RateLimiter::new(3, false);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("10.0.0.1", t0));
        }
        assert!(!limiter.check_at("10.0.0.1", t0 + Duration::from_secs(30)));

        // Another client has its own budget
        assert!(limiter.check_at("10.0.0.2", t0));
    }

    #[test]
    fn window_resets_after_it_ends() {
        let limiter = RateLimiter::new(1, false);
        let t0 = Instant::now();

        assert!(limiter.check_at("a", t0));
        assert!(!limiter.check_at("a", t0 + Duration::from_secs(59)));
        assert!(limiter.check_at("a", t0 + Duration::from_secs(61)));
        assert!(!limiter.check_at("a", t0 + Duration::from_secs(62)));
    }

    #[test]
    fn sweep_evicts_idle_clients() {
        let limiter = RateLimiter::new(5, false);
        let t0 = Instant::now();
        limiter.check_at("old", t0);
        limiter.check_at("fresh", t0 + Duration::from_secs(9 * 60));

        let removed = limiter.sweep_at(t0 + Duration::from_secs(11 * 60));
        assert_eq!(removed, 1);
        assert_eq!(limiter.sweep_at(t0 + Duration::from_secs(11 * 60)), 0);
    }

    #[test]
    fn proxy_headers_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let trusting = RateLimiter::new(1, true);
        assert_eq!(trusting.client_key(&headers, Some(peer)), "203.0.113.7");

        headers.remove("x-forwarded-for");
        assert_eq!(trusting.client_key(&headers, Some(peer)), "198.51.100.2");

        let direct = RateLimiter::new(1, false);
        assert_eq!(direct.client_key(&headers, Some(peer)), "127.0.0.1");
        assert_eq!(direct.client_key(&HeaderMap::new(), None), "unknown");
    }
}
