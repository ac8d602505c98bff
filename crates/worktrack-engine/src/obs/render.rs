use std::collections::BTreeMap;
use std::fmt::Write;

use worktrack_core::{BucketSnapshot, MetricKind, MetricSetSnapshot, Tag};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Metric names may only carry `[a-zA-Z0-9_]`.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn type_of(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Count => "counter",
        MetricKind::Long | MetricKind::Unique => "gauge",
    }
}

/// Render a bucket as text lines `prefix_name{tag="v",...} value`.
///
/// Lines are grouped per metric name under a `# TYPE` header; groups and lines
/// are in sorted order so output is stable.
pub fn render_text(prefix: &str, bucket: &BucketSnapshot) -> String {
    let mut groups: BTreeMap<String, (MetricKind, Vec<String>)> = BTreeMap::new();
    let mut path = Vec::new();
    collect(prefix, &bucket.root, &mut path, &mut groups);

    let mut out = String::new();
    let _ = writeln!(out, "# window {}..{}", bucket.start_millis, bucket.end_millis);
    for (name, (kind, lines)) in groups {
        let _ = writeln!(out, "# TYPE {} {}", name, type_of(kind));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn collect<'a>(
    prefix: &str,
    node: &'a MetricSetSnapshot,
    path: &mut Vec<&'a Tag>,
    groups: &mut BTreeMap<String, (MetricKind, Vec<String>)>,
) {
    let label_str = path
        .iter()
        .map(|t| format!("{}=\"{}\"", sanitize_name(t.name()), escape_label(t.value())))
        .collect::<Vec<_>>()
        .join(",");

    for (name, value) in &node.metrics {
        let full = format!("{}_{}", prefix, sanitize_name(name));
        let line = if label_str.is_empty() {
            format!("{} {}", full, value.as_i64())
        } else {
            format!("{}{{{}}} {}", full, label_str, value.as_i64())
        };
        groups
            .entry(full)
            .or_insert_with(|| (value.kind(), Vec::new()))
            .1
            .push(line);
    }

    for child in &node.children {
        path.push(&child.tag);
        collect(prefix, &child.set, path, groups);
        path.pop();
    }
}
