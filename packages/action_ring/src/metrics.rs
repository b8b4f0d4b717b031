//! Server metrics for observability
//!
//! Provides runtime counters for ring sessions, AI dispatch and the relay.

use ring_gesture::Gesture;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Server-wide metrics
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Ring session metrics
    /// Currently open ring WebSockets
    pub active_sessions: AtomicU64,
    /// Total ring sessions since server start
    pub total_sessions: AtomicU64,

    // Gesture metrics (non-idle transitions, per kind)
    pub rotates: AtomicU64,
    pub press_drags: AtomicU64,
    pub long_presses: AtomicU64,
    pub double_taps: AtomicU64,
    /// Idle resets
    pub idle_resets: AtomicU64,

    // AI metrics
    pub ai_requests: AtomicU64,
    pub ai_failures: AtomicU64,
    /// Responses dropped because a newer request had been issued
    pub ai_stale_responses: AtomicU64,

    // Relay metrics
    pub relay_requests: AtomicU64,
    pub relay_failures: AtomicU64,

    /// Server start time (for uptime calculation)
    start_time: Option<Instant>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn session_opened(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_closed(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn gesture_recognized(&self, gesture: Gesture) {
        let counter = match gesture {
            Gesture::Idle => &self.idle_resets,
            Gesture::Rotate => &self.rotates,
            Gesture::PressDrag => &self.press_drags,
            Gesture::LongPress => &self.long_presses,
            Gesture::DoubleTap => &self.double_taps,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ai_request(&self) {
        self.ai_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ai_failure(&self) {
        self.ai_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ai_stale_response(&self) {
        self.ai_stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn relay_request(&self) {
        self.relay_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn relay_failure(&self) {
        self.relay_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    /// Create a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.uptime_secs(),
            sessions: SessionMetrics {
                active: self.active_sessions.load(Ordering::Relaxed),
                total: self.total_sessions.load(Ordering::Relaxed),
            },
            gestures: GestureMetrics {
                rotate: self.rotates.load(Ordering::Relaxed),
                press_drag: self.press_drags.load(Ordering::Relaxed),
                long_press: self.long_presses.load(Ordering::Relaxed),
                double_tap: self.double_taps.load(Ordering::Relaxed),
                idle_resets: self.idle_resets.load(Ordering::Relaxed),
            },
            ai: AiMetrics {
                requests: self.ai_requests.load(Ordering::Relaxed),
                failures: self.ai_failures.load(Ordering::Relaxed),
                stale_responses: self.ai_stale_responses.load(Ordering::Relaxed),
            },
            relay: RelayMetrics {
                requests: self.relay_requests.load(Ordering::Relaxed),
                failures: self.relay_failures.load(Ordering::Relaxed),
            },
        }
    }
}

/// Serializable snapshot of metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub sessions: SessionMetrics,
    pub gestures: GestureMetrics,
    pub ai: AiMetrics,
    pub relay: RelayMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub active: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureMetrics {
    pub rotate: u64,
    pub press_drag: u64,
    pub long_press: u64,
    pub double_tap: u64,
    pub idle_resets: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiMetrics {
    pub requests: u64,
    pub failures: u64,
    pub stale_responses: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayMetrics {
    pub requests: u64,
    pub failures: u64,
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub sessions: u64,
    pub providers: Vec<ProviderHealth>,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub name: String,
    pub configured: bool,
}
