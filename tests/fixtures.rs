#![allow(dead_code)]
use std::path::PathBuf;

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}

pub fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .canonicalize()
        .unwrap()
}

pub fn keyboard_hwdb() -> PathBuf {
    samples_dir().join("70-inmap-keyboard.hwdb")
}

pub fn hwdb_dir() -> PathBuf {
    samples_dir().join("hwdb.d")
}

pub fn broken_hwdb() -> PathBuf {
    samples_dir().join("broken.hwdb")
}

pub const RECEIVER_MODALIAS: &str = "evdev:input:b0003v046Dp4024e0111-e0,1,4,11,14";
pub const BLUETOOTH_RECEIVER_MODALIAS: &str = "evdev:input:b0005v046Dp4024e0111";
pub const TABLET_MODALIAS: &str = "evdev:input:b0003v056Ap0357e0100";
pub const MOUSE_MODALIAS: &str = "evdev:input:b0003v1234p5678e0110";
pub const UNKNOWN_MODALIAS: &str = "evdev:input:b0011v0001p0001eAB41";
