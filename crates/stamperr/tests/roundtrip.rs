//! Native chains survive rendering and parsing: same text, same matches, same data.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io;

use stamperr::{
    cause, find_data, is_data_kind, is_kind, is_match, parse, trace, DataType, Payload, StampedError,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// `depth` nodes: the payload on the innermost one, alternating plain and
/// context wrappers above it.
fn chain_with<T>(depth: usize, value: T) -> StampedError
where
    T: DataType + Into<Payload>,
{
    let mut err = StampedError::new_data(1, "base failure", "payload", value).unwrap();
    for level in 2..=depth {
        err = if level % 3 == 0 {
            StampedError::context(format!("step {level}:"), err)
        } else {
            StampedError::wrap_kind(level as i64, err, format!("level{level}")).unwrap()
        };
    }
    err
}

fn check_shape<T>(value: T)
where
    T: DataType + Into<Payload> + Clone + PartialEq + Debug,
{
    for depth in 1..=6 {
        let native = chain_with(depth, value.clone());
        let text = native.to_string();
        let parsed = parse(&text);

        assert_eq!(parsed.to_string(), text, "depth {depth}: render changed");
        assert!(native.matches(&parsed), "depth {depth}: {text}");
        assert_eq!(find_data::<T>(&native, "payload"), Some(value.clone()));
        assert_eq!(
            find_data::<T>(&parsed, "payload"),
            Some(value.clone()),
            "depth {depth}: {text}"
        );
    }
}

fn map<T: Clone>(pairs: &[(&str, T)]) -> BTreeMap<String, T> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

// ─── Every shape, depths 1 through 6 ──────────────────────────────────────────

#[test]
fn scalars_round_trip() {
    check_shape(10_i64);
    check_shape(-42_i64);
    check_shape(i64::MAX);
    check_shape(1.453_f32);
    check_shape(-0.1_f64);
    check_shape(1.5e10_f64);
    check_shape(String::from("users.txt"));
    check_shape(String::from("tricky ]; [ts 1] \"quoted\" data kind\n"));
    check_shape(String::new());
}

#[test]
fn lists_round_trip() {
    check_shape(vec![1_i64, -2, 3]);
    check_shape(Vec::<i64>::new());
    check_shape(vec![0.5_f32, 2.25]);
    check_shape(vec![0.1_f64, 1e-7]);
    check_shape(vec!["a]".to_string(), "; b".to_string(), "[c".to_string()]);
}

#[test]
fn maps_round_trip() {
    check_shape(map(&[("a", 1_i64), ("b key", -1)]));
    check_shape(map(&[("x", 0.5_f32)]));
    check_shape(map(&[("ratio", 0.25_f64), ("]", 2.0)]));
    check_shape(map(&[("file", "users.txt".to_string()), ("mode", "r; w".to_string())]));
    check_shape(BTreeMap::<String, String>::new());
}

// ─── Matching ─────────────────────────────────────────────────────────────────

#[test]
fn match_ignores_stamps_at_every_level() {
    let a = StampedError::wrap(10, StampedError::new_data(11, "m", "k", 1).unwrap());
    let b = StampedError::wrap(20, StampedError::new_data(21, "m", "k", 1).unwrap());
    assert!(a.matches(&b));
    assert!(is_match(Some(&a), Some(&parse(&b.to_string()))));
}

#[test]
fn match_sees_changes_anywhere_in_chain() {
    let build = |kind: &str, data: i64, message: &str| {
        let inner = StampedError::new_data(1, message, kind, data).unwrap();
        StampedError::wrap(2, inner)
    };
    let base = build("k", 1, "m");
    assert!(!base.matches(&build("j", 1, "m")));
    assert!(!base.matches(&build("k", 2, "m")));
    assert!(!base.matches(&build("k", 1, "n")));
    assert!(!parse(&base.to_string()).matches(&build("k", 2, "m")));
}

#[test]
fn int_and_float_data_with_same_text_match() {
    let a = StampedError::new_data(1, "m", "k", 3_i64).unwrap();
    let b = StampedError::new_data(1, "m", "k", 3.0_f64).unwrap();
    // both encode as `3`
    assert!(a.matches(&b));
}

// ─── Extraction and chain queries ─────────────────────────────────────────────

#[test]
fn extraction_survives_serialization() {
    let err = StampedError::new_data(1713705663160, "something went wrong", "failure", 10).unwrap();
    let err = StampedError::wrap(1713705663161, err);
    let err = StampedError::wrap(1713705663162, err);
    assert_eq!(find_data::<i64>(&err, "failure"), Some(10));

    let parsed = parse(&err.to_string());
    assert_eq!(find_data::<i64>(&parsed, "failure"), Some(10));
    assert!(is_kind(&parsed, "failure"));
}

#[test]
fn wrong_type_is_not_found() {
    let err = StampedError::new_data(1, "m", "name", "alice").unwrap();
    let err = StampedError::wrap(2, err);
    assert_eq!(find_data::<f64>(&err, "name"), None);
    assert_eq!(find_data::<f64>(&parse(&err.to_string()), "name"), None);
    assert_eq!(find_data::<Vec<String>>(&err, "name"), None);
}

#[test]
fn cause_and_trace_after_parse() {
    let mut err = StampedError::new(7, "base message");
    for ts in [1, 2, 3] {
        err = StampedError::wrap(ts, err);
    }
    let parsed = parse(&err.to_string());
    assert_eq!(trace(&err), vec![3, 2, 1, 7]);
    assert_eq!(trace(&parsed), vec![3, 2, 1, 7]);
    let root = cause(&parsed).downcast_ref::<StampedError>().unwrap();
    assert_eq!(root.message(), "base message");
}

#[test]
fn foreign_cause_round_trips_as_text() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "users.txt: no such file");
    let err = StampedError::wrap_data(5, io_err, "fileopen", "users.txt").unwrap();
    let err = StampedError::context("loading users:", err);
    let err = StampedError::wrap(6, err);
    let text = err.to_string();
    assert_eq!(
        text,
        r#"[ts 6]; loading users: [ts 5 kind fileopen data "users.txt"]; users.txt: no such file"#
    );
    let parsed = parse(&text);
    assert_eq!(parsed.to_string(), text);
    assert!(err.matches(&parsed));
    assert_eq!(cause(&parsed).to_string(), "users.txt: no such file");
}

#[test]
fn bracket_like_foreign_text_is_not_rewritten() {
    for inner in [
        "a[ts 2] x",
        "a\t[ts 2] x",
        "[ts 02] x",
        "[ts 0] x",
        "[ts 2 data 5] x",
        "[ts 2 kind ] x",
    ] {
        let err = StampedError::wrap(1, io::Error::new(io::ErrorKind::Other, inner));
        let text = err.to_string();
        assert_eq!(text, format!("[ts 1]; {inner}"));
        let parsed = parse(&text);
        assert_eq!(parsed.to_string(), text, "{inner:?}");
        assert!(err.matches(&parsed), "{inner:?}");
    }
}

#[test]
fn whitespace_context_round_trips() {
    let err = StampedError::context("  ", StampedError::new(2, "x"));
    let text = err.to_string();
    assert_eq!(text, "   [ts 2] x");
    let parsed = parse(&text);
    assert_eq!(parsed.to_string(), text);
    assert!(err.matches(&parsed));
}

#[test]
fn context_around_plain_text_matches_its_parse() {
    let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
    let err = StampedError::wrap(1, StampedError::context("loading:", io_err));
    let parsed = parse(&err.to_string());
    assert_eq!(parsed.to_string(), "[ts 1]; loading: disk full");
    assert!(err.matches(&parsed));
    assert!(is_match(Some(&parsed), Some(&err)));

    let err = StampedError::context("loading:", StampedError::new(0, "base"));
    assert!(err.matches(&parse(&err.to_string())));
}

#[test]
fn data_kind_survives_serialization() {
    let err = StampedError::wrap(2, StampedError::new_data(1, "m", "ids", vec![1_i64, 2]).unwrap());
    let parsed = parse(&err.to_string());
    assert!(is_data_kind::<Vec<i64>>(&parsed, "ids"));
    assert!(!is_data_kind::<Vec<String>>(&parsed, "ids"));
}
