//! Extraction over real HDF5 files written on the fly.

use std::path::Path;

use bts_parser::{
    default_opener, extract_bytes, AnalysisResult, BtsError, Container, ContainerOpener,
    Hdf5Opener,
};
use dfos_common::{Channel, SchemaVariant};
use test_utils::temp_test_dir;

const ACQUISITION: [&str; 3] = ["Acquisition", "Custom", "Brillouin[0]"];

/// Write an HDF5 file with `build`, close it and return its bytes.
fn write_file(
    dir: &Path,
    name: &str,
    build: impl FnOnce(&hdf5::File) -> hdf5::Result<()>,
) -> Vec<u8> {
    let path = dir.join(name);
    {
        let file = hdf5::File::create(&path).unwrap();
        build(&file).unwrap();
    }
    std::fs::read(&path).unwrap()
}

/// Create the first `depth` groups of the acquisition path.
fn groups(file: &hdf5::File, depth: usize) -> hdf5::Result<hdf5::Group> {
    let mut group = file.create_group(ACQUISITION[0])?;
    for name in &ACQUISITION[1..depth] {
        group = group.create_group(name)?;
    }
    Ok(group)
}

fn write_f64(group: &hdf5::Group, name: &str, shape: &[usize], values: &[f64]) -> hdf5::Result<()> {
    let dataset = group.new_dataset::<f64>().shape(shape.to_vec()).create(name)?;
    dataset.write_raw(values)
}

fn write_f32(group: &hdf5::Group, name: &str, shape: &[usize], values: &[f32]) -> hdf5::Result<()> {
    let dataset = group.new_dataset::<f32>().shape(shape.to_vec()).create(name)?;
    dataset.write_raw(values)
}

/// Two frames of `points` values; frame 1 is frame 0 plus 100.
fn frames(start: f64, points: usize) -> Vec<f64> {
    (0..2)
        .flat_map(|frame| (0..points).map(move |i| start + i as f64 + 100.0 * frame as f64))
        .collect()
}

fn failure(result: AnalysisResult) -> BtsError {
    match result {
        AnalysisResult::Failure(err) => err,
        AnalysisResult::Success(extraction) => {
            panic!("expected failure, got {:?}", extraction.file_type)
        }
    }
}

// ============================================================================
// Successful layouts
// ============================================================================

#[test]
fn test_temp_strain_file_extracts() {
    let work = temp_test_dir();
    let stage = temp_test_dir();
    let bytes = write_file(work.path(), "temp_strain.h5", |file| {
        let group = groups(file, 3)?;
        write_f64(&group, "BrillouinDataTime", &[2], &[0.0, 60.0])?;
        let temperature: Vec<f32> = frames(10.0, 10).into_iter().map(|v| v as f32).collect();
        write_f32(&group, "TemperatureData", &[2, 10], &temperature)?;
        write_f64(&group, "StrainData", &[2, 10], &frames(0.0, 10))
    });

    let opener = default_opener(Some(stage.path().to_path_buf()));
    let extraction = extract_bytes(opener.as_ref(), &bytes).into_result().unwrap();

    assert_eq!(extraction.file_type, SchemaVariant::TempStrain);
    assert_eq!(extraction.time, vec![0.0, 60.0]);
    assert_eq!(extraction.distance_points, 10);
    assert_eq!(extraction.num_frames(), 2);
    assert_eq!(
        extraction.first_frame(Channel::Temperature).unwrap(),
        &frames(10.0, 10)[..10]
    );
    assert_eq!(
        extraction.first_frame(Channel::Strain).unwrap(),
        &frames(0.0, 10)[..10]
    );
    assert_eq!(extraction.metadata.time_shape, vec![2]);
    assert_eq!(extraction.metadata.shapes[&Channel::Temperature], vec![2, 10]);

    assert_eq!(std::fs::read_dir(stage.path()).unwrap().count(), 0);
}

#[test]
fn test_brill_frequency_file_extracts() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "brill.h5", |file| {
        let group = groups(file, 3)?;
        write_f64(&group, "BrillouinDataTime", &[2], &[0.0, 30.0])?;
        write_f64(&group, "FrequencyData", &[2, 8], &frames(10_800.0, 8))?;
        write_f64(&group, "AmplitudeData", &[2, 8], &frames(1.0, 8))
    });

    let result = extract_bytes(&Hdf5Opener::with_temp_dir(work.path()), &bytes);
    let extraction = result.extraction().expect("extraction succeeds");

    assert_eq!(extraction.file_type, SchemaVariant::BrillFrequency);
    assert_eq!(extraction.distance_points, 8);
    assert_eq!(extraction.first_frame(Channel::Frequency).unwrap()[0], 10_800.0);
    assert_eq!(extraction.first_frame(Channel::Amplitude).unwrap()[7], 8.0);
    assert!(extraction.channel(Channel::Strain).is_none());
}

// ============================================================================
// Structural failures
// ============================================================================

#[test]
fn test_partial_pairs_report_presence() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "partial.h5", |file| {
        let group = groups(file, 3)?;
        write_f64(&group, "BrillouinDataTime", &[2], &[0.0, 60.0])?;
        write_f64(&group, "StrainData", &[2, 4], &frames(0.0, 4))?;
        write_f64(&group, "FrequencyData", &[2, 4], &frames(0.0, 4))
    });

    let err = failure(extract_bytes(&Hdf5Opener::with_temp_dir(work.path()), &bytes));
    assert_eq!(err.kind(), "unsupported_structure");
    assert_eq!(
        err.to_string(),
        "Unsupported file structure. Found: StrainData=True, TemperatureData=False, FrequencyData=True, AmplitudeData=False"
    );
}

#[test]
fn test_missing_time_dataset() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "no_time.h5", |file| {
        let group = groups(file, 3)?;
        write_f64(&group, "TemperatureData", &[2, 4], &frames(10.0, 4))?;
        write_f64(&group, "StrainData", &[2, 4], &frames(0.0, 4))
    });

    let err = failure(extract_bytes(&Hdf5Opener::with_temp_dir(work.path()), &bytes));
    assert_eq!(
        err,
        BtsError::MissingMandatoryData(
            "Acquisition/Custom/Brillouin[0]/BrillouinDataTime not found".to_string()
        )
    );
}

#[test]
fn test_missing_acquisition_group() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "no_group.h5", |file| {
        let custom = groups(file, 2)?;
        write_f64(&custom, "BrillouinDataTime", &[2], &[0.0, 60.0])
    });

    let err = failure(extract_bytes(&Hdf5Opener::with_temp_dir(work.path()), &bytes));
    assert_eq!(err.kind(), "missing_mandatory_data");
}

#[test]
fn test_mismatched_distance_points() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "mismatch.h5", |file| {
        let group = groups(file, 3)?;
        write_f64(&group, "BrillouinDataTime", &[2], &[0.0, 60.0])?;
        write_f64(&group, "TemperatureData", &[2, 10], &frames(10.0, 10))?;
        write_f64(&group, "StrainData", &[2, 8], &frames(0.0, 8))
    });

    let err = failure(extract_bytes(&Hdf5Opener::with_temp_dir(work.path()), &bytes));
    assert_eq!(err.kind(), "inconsistent_shape");
}

// ============================================================================
// Container access
// ============================================================================

#[test]
fn test_container_walks_links_and_converts_values() {
    let work = temp_test_dir();
    let bytes = write_file(work.path(), "walk.h5", |file| {
        let group = groups(file, 3)?;
        write_f32(&group, "TemperatureData", &[2, 3], &[1.5, 2.5, 3.5, 4.5, 5.5, 6.5])
    });

    let container = Hdf5Opener::with_temp_dir(work.path()).open(&bytes).unwrap();
    let path = "Acquisition/Custom/Brillouin[0]/TemperatureData";

    assert!(container.has_path("Acquisition"));
    assert!(container.has_path("/Acquisition/Custom/Brillouin[0]/"));
    assert!(container.has_path(path));
    assert!(!container.has_path("Acquisition/Cust"));
    assert!(!container.has_path("Acquisition/Custom/Brillouin[0]/StrainData"));
    assert!(!container.has_path("Missing/Custom/Brillouin[0]"));
    assert!(!container.has_path(""));

    assert_eq!(container.shape(path).unwrap(), vec![2, 3]);
    assert_eq!(
        container.read_values(path).unwrap(),
        vec![1.5, 2.5, 3.5, 4.5, 5.5, 6.5]
    );
    assert!(matches!(
        container.read_values("Acquisition/Custom/Brillouin[0]/StrainData"),
        Err(BtsError::Format(_))
    ));
}
