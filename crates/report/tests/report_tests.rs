//! Export tests over fixture extractions.

use std::io::Read;

use bts_parser::{extract_from, Extraction};
use chrono::{NaiveDate, NaiveDateTime};
use dfos_common::{Channel, ChannelControls, XRange};
use flate2::read::ZlibDecoder;
use report::{comparison_report, single_report, write_csv, ReportError, ReportFile};
use test_utils::{brill_frequency, small_temp_strain, temp_strain};

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn extraction(builder: test_utils::FixtureBuilder) -> Extraction {
    extract_from(&builder.build()).into_result().unwrap()
}

fn plain(name: &str, extraction: &Extraction) -> ReportFile {
    ReportFile::new(name, extraction, |_| ChannelControls::default()).unwrap()
}

/// Decompressed text of every content stream.
fn page_texts(pdf: &[u8]) -> Vec<String> {
    let mut texts = Vec::new();
    let mut rest = pdf;
    let marker = b">>\nstream\n";
    while let Some(start) = find(rest, marker) {
        let body = &rest[start + marker.len()..];
        let end = find(body, b"\nendstream").expect("stream is terminated");
        let mut text = String::new();
        ZlibDecoder::new(&body[..end])
            .read_to_string(&mut text)
            .expect("content stream inflates");
        texts.push(text);
        rest = &body[end..];
    }
    texts
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn page_count(pdf: &[u8]) -> usize {
    pdf.windows(b"/Type /Page /Parent".len())
        .filter(|w| *w == b"/Type /Page /Parent")
        .count()
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_reflects_offset_and_range() {
    let extraction = extraction(small_temp_strain());
    let file = ReportFile::new("run.h5", &extraction, |channel| match channel {
        Channel::Temperature => ChannelControls::new(5.0, Some(XRange::new(2, 6))).unwrap(),
        _ => ChannelControls::default(),
    })
    .unwrap();

    let text = String::from_utf8(write_csv(&file).unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Distance_Index,Temperature_C,Strain_ue");
    assert_eq!(
        &lines[1..],
        &["2,17,2", "3,18,3", "4,19,4", "5,20,5", "6,21,6"]
    );
}

#[test]
fn test_csv_brill_frequency_columns() {
    let extraction = extraction(brill_frequency(2, 4));
    let text = String::from_utf8(write_csv(&plain("b.bts", &extraction)).unwrap()).unwrap();
    assert!(text.starts_with("Distance_Index,Frequency_GHz,Amplitude\n"));
    assert_eq!(text.lines().count(), 5);
}

// ============================================================================
// PDF
// ============================================================================

#[test]
fn test_single_report_pages_and_stats() {
    let extraction = extraction(small_temp_strain());
    let file = ReportFile::new("run.h5", &extraction, |channel| match channel {
        Channel::Temperature => ChannelControls::new(5.0, Some(XRange::new(2, 6))).unwrap(),
        _ => ChannelControls::default(),
    })
    .unwrap();

    let pdf = single_report(&file, generated_at()).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF\n"));
    assert_eq!(page_count(&pdf), 3);

    let pages = page_texts(&pdf);
    assert_eq!(pages.len(), 3);
    assert!(pages[0].contains("DFOS Monitoring Report"));
    assert!(pages[0].contains("File: run.h5"));
    assert!(pages[0].contains("Generated: 2024-05-17 09:30:00"));
    assert!(pages[0].contains("Distance Points: 10"));

    assert!(pages[1].contains("Temperature Distribution \\(First Sweep\\)"));
    assert!(pages[1].contains("Min: 17.00 \\260C"));
    assert!(pages[1].contains("Max: 21.00 \\260C"));
    assert!(pages[1].contains("Mean: 19.00 \\260C"));
    assert!(pages[2].contains("Strain Distribution"));
}

#[test]
fn test_comparison_report_with_difference_page() {
    let first = extraction(temp_strain(2, 50));
    let second = extraction(temp_strain(3, 50));
    let a = plain("a.h5", &first);
    let b = ReportFile::new("b.h5", &second, |_| ChannelControls::new(1.0, None).unwrap()).unwrap();

    let pdf = comparison_report(&a, &b, generated_at()).unwrap();
    assert_eq!(page_count(&pdf), 4);

    let pages = page_texts(&pdf);
    assert!(pages[0].contains("File 1: a.h5"));
    assert!(pages[0].contains("File 2: b.h5"));
    assert!(pages[1].contains("Temperature Comparison"));
    assert!(pages[1].contains("[6 4] 0 d"));
    assert!(pages[3].contains("Temperature Difference \\(File 2 - File 1\\)"));
    assert!(pages[3].contains("Max: 1.00 \\260C"));
    assert!(pages[3].contains("Mean: 1.00 \\260C"));
}

#[test]
fn test_comparison_without_matching_points_has_no_difference_page() {
    let a = plain("a.h5", &extraction(temp_strain(1, 50)));
    let b = plain("b.h5", &extraction(temp_strain(1, 40)));
    let pdf = comparison_report(&a, &b, generated_at()).unwrap();
    assert_eq!(page_count(&pdf), 3);
}

#[test]
fn test_comparison_of_different_variants_is_rejected() {
    let a = plain("a.h5", &extraction(temp_strain(1, 10)));
    let b = plain("b.h5", &extraction(brill_frequency(1, 10)));
    let err = comparison_report(&a, &b, generated_at()).unwrap_err();
    assert!(matches!(err, ReportError::Incompatible(_)));
}
