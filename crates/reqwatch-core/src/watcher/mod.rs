//! Request watcher: the three host event handlers and the record sink.
//!
//! Handlers run to completion without suspending. The only deferred step is
//! the tab lookup for requests that belong to a page; those run as tasks on
//! the tokio runtime and deliver their record when the lookup succeeds. The
//! pending entry is removed before the lookup starts, so a request can never
//! be delivered twice. Outside a runtime such records are dropped.

mod events;
mod service;
mod tabs;

use std::any::Any;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};

use crate::config::{WatcherConfig, DEFAULT_USER_AGENT};
use crate::correlation::PendingTable;
use crate::logging::Logger;
use crate::model::{
    assemble_record, ErrorInfo, RequestRecord, ResponseInfo, SendHeadersInfo, NO_TAB,
};
use crate::rules::{evaluate, PatternError, RuleConfig, RuleUpdate};

pub use events::{
    parse_event_line, EventError, EventKind, Subscription, WatcherEvent, SUBSCRIPTIONS, URL_FILTER,
};
pub use service::{EventSender, NetworkEvents, Registration, WatcherService};
pub use tabs::{NoTabs, StaticTabs, TabRegistry};

/// Consumer of matched requests.
///
/// Called once per matched request. Panics are not caught by the watcher.
pub trait RecordSink: Send + Sync + 'static {
    fn deliver(&self, record: RequestRecord);
}

impl<F> RecordSink for F
where
    F: Fn(RequestRecord) + Send + Sync + 'static,
{
    fn deliver(&self, record: RequestRecord) {
        self(record)
    }
}

pub struct RequestWatcher<T: TabRegistry = NoTabs> {
    table: PendingTable,
    rules: RuleConfig,
    sink: Option<Arc<dyn RecordSink>>,
    tabs: Arc<T>,
    user_agent: String,
    logger: Logger,
    lookups: JoinSet<()>,
    /// First sink panic seen in a finished lookup; resumed by `flush`.
    deferred_panic: Option<Box<dyn Any + Send>>,
}

impl<T: TabRegistry> RequestWatcher<T> {
    /// Watcher with empty rules and no sink.
    pub fn new(tabs: T) -> Self {
        Self {
            table: PendingTable::new(),
            rules: RuleConfig::new(),
            sink: None,
            tabs: Arc::new(tabs),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            logger: Logger::default(),
            lookups: JoinSet::new(),
            deferred_panic: None,
        }
    }

    /// Watcher set up from the config file: user agent, logger state and initial rules.
    pub fn from_config(cfg: &WatcherConfig, tabs: T) -> Self {
        let mut watcher = Self::new(tabs).with_user_agent(cfg.user_agent.clone());
        watcher.logger.set_enabled(cfg.logging_enabled);
        watcher.update_config(cfg.rules.clone());
        watcher
    }

    pub fn with_sink(mut self, sink: impl RecordSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace or clear the sink. Without a sink, responses are still
    /// correlated (and dropped from the table) but nothing is evaluated.
    pub fn set_sink(&mut self, sink: Option<Arc<dyn RecordSink>>) {
        self.sink = sink;
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Number of requests waiting for a response or an error.
    pub fn pending_len(&self) -> usize {
        self.table.len()
    }

    /// Number of tab lookups started and not yet collected by `flush`.
    pub fn lookups_in_flight(&self) -> usize {
        self.lookups.len()
    }

    /// Apply a partial rule update. Rejected URL patterns are logged and
    /// returned; they never fail the update.
    pub fn update_config(&mut self, update: RuleUpdate) -> Vec<PatternError> {
        let rejected = self.rules.apply(update);
        for err in &rejected {
            tracing::warn!("{}", err);
        }
        rejected
    }

    /// Dispatch one event to its handler.
    pub fn handle(&mut self, event: WatcherEvent) {
        match event {
            WatcherEvent::SendHeaders(info) => self.on_send_headers(info),
            WatcherEvent::HeadersReceived(res) => self.on_headers_received(res),
            WatcherEvent::ErrorOccurred(info) => self.on_error_occurred(&info),
            WatcherEvent::UpdateRules(update) => {
                self.update_config(update);
            }
        }
    }

    pub fn on_send_headers(&mut self, info: SendHeadersInfo) {
        let id = info.request_id.clone();
        if self.table.record_sent(info, &self.rules.matching_hosts) {
            self.logger.log(format_args!("tracking request {}", id));
        }
    }

    pub fn on_headers_received(&mut self, res: ResponseInfo) {
        self.deliver_matched(res);
        self.reap_lookups();
    }

    fn deliver_matched(&mut self, res: ResponseInfo) {
        let Some(req) = self.table.resolve(&res.request_id) else {
            return;
        };
        let Some(sink) = self.sink.as_ref().map(Arc::clone) else {
            return;
        };
        let Some(rule) = evaluate(&self.rules, &res) else {
            return;
        };
        self.logger
            .log(format_args!("request {} matched {} ({})", req.request_id, rule.as_str(), res.url));

        if req.tab_id == NO_TAB {
            sink.deliver(assemble_record(&req, &res, None, &self.user_agent));
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!(
                request_id = %req.request_id,
                tab_id = req.tab_id,
                "no async runtime for tab lookup, record dropped"
            );
            return;
        };
        let tabs = Arc::clone(&self.tabs);
        let user_agent = self.user_agent.clone();
        self.lookups.spawn_on(
            async move {
                match tabs.get(req.tab_id).await {
                    Ok(tab) => sink.deliver(assemble_record(&req, &res, Some(&tab), &user_agent)),
                    Err(e) => tracing::debug!(
                        request_id = %req.request_id,
                        tab_id = req.tab_id,
                        "tab lookup failed, record dropped: {:#}",
                        e
                    ),
                }
            },
            &runtime,
        );
    }

    pub fn on_error_occurred(&mut self, info: &ErrorInfo) {
        self.table.discard(&info.request_id);
        if let Some(error) = &info.error {
            self.logger
                .log(format_args!("request {} failed: {}", info.request_id, error));
        }
    }

    /// Wait for every outstanding tab lookup to deliver or drop its record.
    ///
    /// A panic raised by the sink inside a lookup task is resumed here, and
    /// only here.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.lookups.join_next().await {
            self.keep_panic(joined);
        }
        if let Some(payload) = self.deferred_panic.take() {
            std::panic::resume_unwind(payload);
        }
    }

    /// Collect lookup tasks that already finished so the set stays small.
    fn reap_lookups(&mut self) {
        while let Some(joined) = self.lookups.try_join_next() {
            self.keep_panic(joined);
        }
    }

    fn keep_panic(&mut self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            if e.is_panic() && self.deferred_panic.is_none() {
                self.deferred_panic = Some(e.into_panic());
            }
        }
    }
}
