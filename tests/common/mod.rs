#![allow(dead_code)]

use adas_parser::{
    formats::{AdasData, OutputMode},
    provider::{load, LocalDirectory},
    LabeledArray,
};
use camino::Utf8PathBuf;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Provider over the fixture files of `tests/data`.
pub fn fixtures() -> LocalDirectory {
    LocalDirectory::new(Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data"))
}

pub fn load_fixture(dataset: &str, mode: OutputMode) -> AdasData {
    init_logger();
    load(&fixtures(), dataset, mode).unwrap()
}

pub fn load_array(dataset: &str) -> LabeledArray {
    load_fixture(dataset, OutputMode::Labeled).into_array().unwrap()
}
