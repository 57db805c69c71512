mod fixtures;

use fixtures::*;

use inmap::event::{EV_ABS, EV_KEY};
use inmap::{Context, Hwdb, HwdbError, PropertyDatabase};
use log::Level;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn context_for(hwdb: Hwdb) -> Arc<Context> {
    Arc::new(Context::new().with_database(hwdb))
}

#[test]
fn test_lookup_builds_mapping_from_prefixed_properties() {
    ensure_env_logger_initialized();
    let ctx = context_for(Hwdb::from_path(keyboard_hwdb()).unwrap());

    let mapping = ctx.lookup_by_modalias(RECEIVER_MODALIAS).unwrap().unwrap();

    assert_eq!(mapping.translate(EV_KEY, 240), 237);
    assert_eq!(mapping.translate(EV_KEY, 0xf1), 0x160);
    assert_eq!(mapping.translate(EV_KEY, 183), 248);
    assert_eq!(mapping.translate(EV_KEY, 30), 30);
    assert_eq!(mapping.tables().count(), 1);
}

#[test]
fn test_second_match_line_selects_same_record() {
    let ctx = context_for(Hwdb::from_path(keyboard_hwdb()).unwrap());

    let mapping = ctx
        .lookup_by_modalias(BLUETOOTH_RECEIVER_MODALIAS)
        .unwrap()
        .unwrap();

    assert_eq!(mapping.translate(EV_KEY, 240), 237);
}

#[test]
fn test_malformed_properties_are_skipped() {
    let ctx = context_for(Hwdb::from_path(keyboard_hwdb()).unwrap());

    let mapping = ctx.lookup_by_modalias(TABLET_MODALIAS).unwrap().unwrap();

    let abs: Vec<(u16, u16)> = mapping
        .table(EV_ABS)
        .unwrap()
        .entries()
        .iter()
        .map(|e| (e.from, e.to))
        .collect();
    assert_eq!(abs, vec![(0, 1), (1, 0)]);
    assert_eq!(mapping.tables().count(), 1);
}

#[test]
fn test_known_device_without_rules_gets_empty_mapping() {
    let ctx = context_for(Hwdb::from_path(keyboard_hwdb()).unwrap());

    let mapping = ctx.lookup_by_modalias(MOUSE_MODALIAS).unwrap().unwrap();

    assert_eq!(mapping.tables().count(), 0);
    assert_eq!(mapping.translate(EV_KEY, 240), 240);
}

#[test]
fn test_unknown_device_gets_no_mapping() {
    let ctx = context_for(Hwdb::from_path(keyboard_hwdb()).unwrap());

    assert!(ctx.lookup_by_modalias(UNKNOWN_MODALIAS).unwrap().is_none());
    assert_eq!(inmap::translate(None, EV_KEY, 240), 240);
}

#[test]
fn test_directory_sources_load_in_lexical_order() {
    let hwdb = Hwdb::from_dir(hwdb_dir()).unwrap();

    // README is not a `*.hwdb` file.
    assert_eq!(hwdb.len(), 2);

    let ctx = context_for(hwdb);
    let receiver = ctx.lookup_by_modalias(RECEIVER_MODALIAS).unwrap().unwrap();
    assert_eq!(receiver.translate(EV_KEY, 183), 248);
    assert_eq!(receiver.translate(EV_KEY, 240), 237);

    let other = ctx
        .lookup_by_modalias("evdev:input:b0003v046DpC52B")
        .unwrap()
        .unwrap();
    assert_eq!(other.translate(EV_KEY, 183), 184);
}

#[test]
fn test_extend_prefers_later_sources() {
    let mut hwdb = Hwdb::from_dir(hwdb_dir()).unwrap();
    hwdb.extend(
        "evdev:input:b0003v046D*\n INMAP_MAP_KEY_F13=F15\n"
            .parse()
            .unwrap(),
    );

    let props = hwdb.properties(RECEIVER_MODALIAS);
    let f13 = props
        .iter()
        .find(|p| p.name == "INMAP_MAP_KEY_F13")
        .unwrap();
    assert_eq!(f13.value, "F15");
}

#[test]
fn test_broken_source_reports_file_and_line() {
    let err = Hwdb::from_path(broken_hwdb()).unwrap_err();

    match &err {
        HwdbError::InFile { path, source } => {
            assert_eq!(path, &broken_hwdb());
            assert!(matches!(
                **source,
                HwdbError::MissingAssignment { line: 2, .. }
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("broken.hwdb"), "{err}");
}

#[test]
fn test_missing_source_is_io_error() {
    let err = Hwdb::from_path(samples_dir().join("does-not-exist.hwdb")).unwrap_err();

    assert!(matches!(err, HwdbError::Io { .. }));
}

#[test]
fn test_overwrites_are_reported_to_log_fn() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let hwdb: Hwdb = "\
evdev:input:*
 INMAP_MAP_KEY_UNKNOWN=BLUETOOTH
 INMAP_MAP_0x1_0xf0=0x160
"
    .parse()
    .unwrap();

    let ctx = Arc::new(
        Context::new()
            .with_database(hwdb)
            .with_log_fn(move |level, args| sink.lock().unwrap().push((level, args.to_string()))),
    );

    let mapping = ctx.lookup_by_modalias("evdev:input:x").unwrap().unwrap();

    // Properties arrive sorted by name, so the hex rule is applied first.
    assert_eq!(mapping.translate(EV_KEY, 240), 237);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, Level::Debug);
    assert!(seen[0].1.contains("overwriting existing key 240"), "{}", seen[0].1);
}
