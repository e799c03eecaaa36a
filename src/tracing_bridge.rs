//! Bridge from `tracing` spans to Micromegas thread-local named scopes.
//!
//! With the `trace` feature Bevy emits a `tracing` span for every schedule
//! run. `MicromegasBridgeLayer` forwards spans whose metadata name is in its
//! allow-list as Micromegas named scopes, labelled by the span's `name`
//! field when it has one (schedule spans do) and by the metadata name
//! otherwise. The lab's own tick work is already scoped with `span_scope!`.

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

// All bridged spans share a single static source location.
micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

/// Span names bridged by `MicromegasBridgeLayer::default()`.
pub const DEFAULT_BRIDGED_SPANS: &[&str] = &["schedule"];

/// Scope label stored in each bridged span's extensions.
struct BridgedScope {
    label: &'static str,
}

/// Pulls the `name` field out of span attributes.
#[derive(Default)]
struct NameVisitor {
    name: Option<String>,
}

impl Visit for NameVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "name" {
            self.name = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "name" && self.name.is_none() {
            self.name = Some(format!("{:?}", value));
        }
    }
}

/// A `tracing_subscriber::Layer` forwarding selected spans to Micromegas.
pub struct MicromegasBridgeLayer {
    bridged: Vec<&'static str>,
}

impl Default for MicromegasBridgeLayer {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGED_SPANS)
    }
}

impl MicromegasBridgeLayer {
    pub fn new(bridged: &[&'static str]) -> Self {
        Self {
            bridged: bridged.to_vec(),
        }
    }

    /// Whether spans with this metadata name are forwarded.
    pub fn bridges(&self, span_name: &str) -> bool {
        self.bridged.contains(&span_name)
    }
}

/// Scope label for a span: its `name` field, else its metadata name.
fn scope_label(field_name: Option<String>, span_name: &'static str) -> String {
    field_name.unwrap_or_else(|| span_name.to_string())
}

impl<S> Layer<S> for MicromegasBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span_name = attrs.metadata().name();
        if !self.bridges(span_name) {
            return;
        }

        let mut visitor = NameVisitor::default();
        attrs.record(&mut visitor);
        let label = intern_string(&scope_label(visitor.name, span_name));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedScope { label });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let extensions = span.extensions();
        if let Some(scope) = extensions.get::<BridgedScope>() {
            on_begin_named_scope(&BRIDGE_LOCATION, scope.label);
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let extensions = span.extensions();
        if let Some(scope) = extensions.get::<BridgedScope>() {
            on_end_named_scope(&BRIDGE_LOCATION, scope.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bridges_schedules_only() {
        let layer = MicromegasBridgeLayer::default();
        assert!(layer.bridges("schedule"));
        assert!(!layer.bridges("system"));
    }

    #[test]
    fn custom_allow_list() {
        let layer = MicromegasBridgeLayer::new(&["schedule", "system"]);
        assert!(layer.bridges("system"));
        assert!(!layer.bridges("lab_tick"));
    }

    #[test]
    fn label_prefers_name_field() {
        assert_eq!(scope_label(Some("Update".into()), "schedule"), "Update");
        assert_eq!(scope_label(None, "schedule"), "schedule");
    }
}
