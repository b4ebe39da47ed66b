//! Request counters rendered as Prometheus text.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestStats {
    queries: AtomicU64,
    query_failures: AtomicU64,
    uploads: AtomicU64,
    transcriptions: AtomicU64,
    chats: AtomicU64,
}

impl RequestStats {
    pub fn record_query(&self, ok: bool) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.query_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_upload(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transcription(&self) {
        self.transcriptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chat(&self) {
        self.chats.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render(&self, service: &str, version: &str, plans: usize) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "\
# HELP clausemind_up Service up indicator\n\
# TYPE clausemind_up gauge\n\
clausemind_up 1\n\
# HELP clausemind_info Service info\n\
# TYPE clausemind_info gauge\n\
clausemind_info{{service=\"{service}\",version=\"{version}\"}} 1\n\
# HELP clausemind_queries_total Queries processed\n\
# TYPE clausemind_queries_total counter\n\
clausemind_queries_total {}\n\
# HELP clausemind_query_failures_total Queries that ended in an error\n\
# TYPE clausemind_query_failures_total counter\n\
clausemind_query_failures_total {}\n\
# HELP clausemind_uploads_total Documents segmented via /api/upload\n\
# TYPE clausemind_uploads_total counter\n\
clausemind_uploads_total {}\n\
# HELP clausemind_transcriptions_total Audio clips transcribed\n\
# TYPE clausemind_transcriptions_total counter\n\
clausemind_transcriptions_total {}\n\
# HELP clausemind_chats_total Advisor chat replies served\n\
# TYPE clausemind_chats_total counter\n\
clausemind_chats_total {}\n\
# HELP clausemind_alternate_plans Plans available for alternate suggestions\n\
# TYPE clausemind_alternate_plans gauge\n\
clausemind_alternate_plans {plans}\n",
            self.queries.load(Ordering::Relaxed),
            self.query_failures.load(Ordering::Relaxed),
            self.uploads.load(Ordering::Relaxed),
            self.transcriptions.load(Ordering::Relaxed),
            self.chats.load(Ordering::Relaxed),
        );
        out
    }
}
