use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt::{self as stdfmt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::Event;
use tracing::Subscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{
    self as fmt_subscriber, format::Writer, FmtContext, FormatEvent, FormatFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const SERVICE_NAME: &str = "cartograph";

pub fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cartograph=info,info"));

    let stdout = std::io::stdout;
    let stderr = std::io::stderr;

    let writer = stdout
        .with_max_level(tracing::Level::INFO)
        .or_else(stderr.with_min_level(tracing::Level::WARN));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .event_format(KeyValueFormatter::new())
        .fmt_fields(fmt_subscriber::format::DefaultFields::new())
        .with_writer(writer)
        .try_init()
        .map_err(|err| crate::err!("failed to initialise tracing subscriber: {err}"))
}

struct KeyValueFormatter {
    service_name: &'static str,
}

impl KeyValueFormatter {
    const fn new() -> Self {
        Self {
            service_name: SERVICE_NAME,
        }
    }
}

impl<S, N> FormatEvent<S, N> for KeyValueFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let pid = std::process::id().to_string();
        let metadata = event.metadata();
        let component = metadata.target();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());

        let mut fields = visitor.fields;
        fields.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

        let span_path = current_span_path(ctx);

        let mut line = String::new();
        push_field(&mut line, "ts", &timestamp);
        push_field(&mut line, "level", metadata.level().as_str());
        push_field(&mut line, "service", self.service_name);
        push_field(&mut line, "component", component);
        push_field(&mut line, "pid", &pid);

        if let Some(span_path) = span_path {
            push_field(&mut line, "span", &span_path);
        }

        push_field(&mut line, "msg", &message);

        for (key, value) in fields {
            push_field(&mut line, &key, &value);
        }

        if let Some(file) = metadata.file() {
            push_field(&mut line, "file", file);
        }
        if let Some(line_no) = metadata.line() {
            push_field(&mut line, "line", &line_no.to_string());
        }

        writer.write_str(&line)?;
        writer.write_char('\n')
    }
}

fn current_span_path<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    let span = ctx.lookup_current()?;
    let names: Vec<&str> = span.scope().from_root().map(|s| s.name()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join("."))
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record_field(&mut self, field: &Field, value: String) {
        if field.name().is_empty() {
            return;
        }
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_field(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        self.record_field(field, format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_field(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_field(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_field(field, value.to_string());
    }
}

#[derive(Default)]
pub struct RuntimeCounters {
    refresh_started: AtomicU64,
    refresh_completed: AtomicU64,
    refresh_superseded: AtomicU64,
    route_list_failures: AtomicU64,
    route_detail_skips: AtomicU64,
    layout_saves: AtomicU64,
    layout_save_failures: AtomicU64,
    layout_resets: AtomicU64,
    layout_corrupt_loads: AtomicU64,
    probes: ProbeOutcomeRegistry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeCountersSnapshot {
    pub refresh_started: u64,
    pub refresh_completed: u64,
    pub refresh_superseded: u64,
    pub route_list_failures: u64,
    pub route_detail_skips: u64,
    pub layout_saves: u64,
    pub layout_save_failures: u64,
    pub layout_resets: u64,
    pub layout_corrupt_loads: u64,
    pub probe_outcomes: Vec<ProbeOutcomeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeOutcomeSnapshot {
    pub endpoint: String,
    pub up: u64,
    pub down: u64,
}

static RUNTIME_COUNTERS: OnceLock<RuntimeCounters> = OnceLock::new();

pub fn runtime_counters() -> &'static RuntimeCounters {
    RUNTIME_COUNTERS.get_or_init(RuntimeCounters::default)
}

impl RuntimeCounters {
    pub fn inc_refresh_started(&self) {
        self.refresh_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refresh_completed(&self) {
        self.refresh_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refresh_superseded(&self) {
        self.refresh_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_route_list_failure(&self) {
        self.route_list_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_route_detail_skip(&self) {
        self.route_detail_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_layout_save(&self) {
        self.layout_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_layout_save_failure(&self) {
        self.layout_save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_layout_reset(&self) {
        self.layout_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_layout_corrupt_load(&self) {
        self.layout_corrupt_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_probe_outcome(&self, endpoint: &str, up: bool) {
        self.probes.record(endpoint, up);
    }

    pub fn snapshot(&self) -> RuntimeCountersSnapshot {
        RuntimeCountersSnapshot {
            refresh_started: self.refresh_started.load(Ordering::Relaxed),
            refresh_completed: self.refresh_completed.load(Ordering::Relaxed),
            refresh_superseded: self.refresh_superseded.load(Ordering::Relaxed),
            route_list_failures: self.route_list_failures.load(Ordering::Relaxed),
            route_detail_skips: self.route_detail_skips.load(Ordering::Relaxed),
            layout_saves: self.layout_saves.load(Ordering::Relaxed),
            layout_save_failures: self.layout_save_failures.load(Ordering::Relaxed),
            layout_resets: self.layout_resets.load(Ordering::Relaxed),
            layout_corrupt_loads: self.layout_corrupt_loads.load(Ordering::Relaxed),
            probe_outcomes: self.probes.snapshot(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ProbeOutcomeEntry {
    up: u64,
    down: u64,
}

#[derive(Default)]
struct ProbeOutcomeRegistry {
    inner: Mutex<BTreeMap<String, ProbeOutcomeEntry>>,
}

impl ProbeOutcomeRegistry {
    fn record(&self, endpoint: &str, up: bool) {
        let mut guard = self.inner.lock().expect("probe outcome registry poisoned");
        let entry = guard.entry(endpoint.to_string()).or_default();
        if up {
            entry.up = entry.up.saturating_add(1);
        } else {
            entry.down = entry.down.saturating_add(1);
        }
    }

    fn snapshot(&self) -> Vec<ProbeOutcomeSnapshot> {
        let guard = self.inner.lock().expect("probe outcome registry poisoned");
        guard
            .iter()
            .map(|(endpoint, entry)| ProbeOutcomeSnapshot {
                endpoint: endpoint.clone(),
                up: entry.up,
                down: entry.down,
            })
            .collect()
    }
}

fn encode_field_value(value: &str) -> String {
    let needs_quotes = value.chars().any(|c| {
        c.is_whitespace()
            || matches!(
                c,
                '"' | '\\' | '=' | '[' | ']' | '{' | '}' | ',' | '\n' | '\r' | '\t'
            )
    });

    if !needs_quotes {
        return value.to_string();
    }

    let mut encoded = String::with_capacity(value.len() + 2);
    encoded.push('"');
    for ch in value.chars() {
        match ch {
            '"' => encoded.push_str("\\\""),
            '\\' => encoded.push_str("\\\\"),
            '\n' => encoded.push_str("\\n"),
            '\r' => encoded.push_str("\\r"),
            '\t' => encoded.push_str("\\t"),
            _ => encoded.push(ch),
        }
    }
    encoded.push('"');
    encoded
}

fn push_field(buffer: &mut String, key: &str, value: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(key);
    buffer.push('=');
    buffer.push_str(&encode_field_value(value));
}
