//! End-to-end rendering of projected histograms to every output format.

use cv_render::{DrawOptions, OutputFormat, RenderConfig, RenderError, render_to_bytes};
use cv_root::{Binning, Histogram, MemoryColumns, project};

fn projected(varexp: &str, binning: &str) -> Histogram {
    let n = 500;
    let energy: Vec<f64> = (0..n).map(|i| (i as f64 * 37.0) % 1000.0).collect();
    let range: Vec<f64> = energy.iter().map(|e| e / 200.0).collect();
    let source = MemoryColumns::new(n)
        .with_column("energy", energy)
        .unwrap()
        .with_column("range", range)
        .unwrap();
    let binning = Binning::parse(binning).unwrap();
    project(&source, "hist_test", varexp, &binning, "energy > 100").unwrap()
}

#[test]
fn svg_document_for_1d() {
    let h = projected("energy", "50, 0, 1000");
    let svg = cv_render::render_svg(&h, &DrawOptions::parse("HIST"), &RenderConfig::default())
        .unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<polyline"));
    assert!(svg.contains("energy {energy &gt; 100}"));
}

#[test]
fn svg_document_for_2d_colz_log() {
    let h = projected("range:energy", "20, 0, 1000, 10, 0, 5");
    let options = DrawOptions::parse("COLZ").with_log(true);
    let svg = cv_render::render_svg(&h, &options, &RenderConfig::default()).unwrap();
    assert!(svg.contains("clip-path"));
    assert!(svg.contains("10\u{2070}") || svg.contains("10\u{00B9}"));
}

#[test]
fn writes_file_chosen_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let h = projected("energy", "50, 0, 1000");
    let path = dir.path().join("energy.svg");
    cv_render::render_to_file(&h, &DrawOptions::default(), &path, &RenderConfig::default())
        .unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("</svg>\n"));
}

#[test]
fn unknown_extension_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let h = projected("energy", "50, 0, 1000");
    let path = dir.path().join("energy.gif");
    let err = cv_render::render_to_file(&h, &DrawOptions::default(), &path, &RenderConfig::default())
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownFormat(_)));
    assert!(!path.exists());
}

#[cfg(feature = "png")]
#[test]
fn png_bytes_have_png_magic() {
    let h = projected("range:energy", "20, 0, 1000, 10, 0, 5");
    let mut config = RenderConfig::default();
    config.output.dpi = 72;
    let bytes =
        render_to_bytes(&h, &DrawOptions::parse("COL"), OutputFormat::Png, &config).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_bytes_have_pdf_magic() {
    let h = projected("energy", "50, 0, 1000");
    let bytes = render_to_bytes(
        &h,
        &DrawOptions::parse("E"),
        OutputFormat::Pdf,
        &RenderConfig::default(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
