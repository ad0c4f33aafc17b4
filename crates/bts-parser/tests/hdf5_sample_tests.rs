//! Reads real captures when they are available.
//!
//! Needs a sample file under `testdata/` or `DFOS_TEST_DATA_DIR`; skipped
//! otherwise.

use std::fs::File;

use bts_parser::{extract, BtsError, Hdf5Opener};
use test_utils::require_test_file;

#[test]
fn test_sample_capture_extracts() {
    let path = require_test_file!("sample_capture.h5");
    let file = File::open(path).unwrap();

    let extraction = extract(&Hdf5Opener::new(), file).into_result().unwrap();
    assert!(extraction.distance_points > 0);
    for data in &extraction.channels {
        assert_eq!(data.first_frame.len(), extraction.distance_points);
    }
}

#[test]
fn test_text_file_is_format_error() {
    let dir = test_utils::temp_test_dir();
    let opener = Hdf5Opener::with_temp_dir(dir.path());
    let result = bts_parser::extract_bytes(&opener, b"Distance_Index,Temperature_C\n0,1.0\n");
    assert!(matches!(result.error(), Some(BtsError::Format(_))));
}
