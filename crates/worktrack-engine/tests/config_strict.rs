#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use worktrack_engine::config::{self, OutputKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
engine:
  collector_window_ms: 30000
  sampler_windw_ms: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.engine.collector_window(), Duration::from_secs(30));
    assert_eq!(cfg.engine.sampler_window(), Duration::from_secs(1));
    assert_eq!(cfg.engine.zombie_threshold(), Duration::from_secs(300));
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.output.kind, OutputKind::Log);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
engine:
  collector_window_ms: 10000
  sampler_window_ms: 500
  zombie_threshold_ms: 60000
server:
  listen: "127.0.0.1:9000"
output:
  kind: none
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.engine.collector_window(), Duration::from_secs(10));
    assert_eq!(cfg.engine.sampler_window(), Duration::from_millis(500));
    assert_eq!(cfg.output.kind, OutputKind::None);
}

#[test]
fn rejects_out_of_range_windows() {
    let cases = [
        "version: 1\nengine:\n  collector_window_ms: 10\n",
        "version: 1\nengine:\n  sampler_window_ms: 0\n",
        "version: 1\nengine:\n  collector_window_ms: 1000\n  sampler_window_ms: 2000\n",
        "version: 1\nengine:\n  zombie_threshold_ms: 5\n",
        "version: 2\n",
    ];
    for case in cases {
        let err = config::load_from_str(case).expect_err(case);
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "case={case}");
    }
}
