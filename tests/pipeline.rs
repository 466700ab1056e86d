//! End-to-end pipeline tests with the real backend.
//!
//! These drive scan → process → manifest against synthetic JPEGs in a temp
//! directory and assert on the files and JSON the pipeline leaves behind.

use picshelf::config::GalleryConfig;
use picshelf::imaging::RustBackend;
use picshelf::manifest::{self, ManifestBuilder, ManifestStats};
use picshelf::process::{self, ProcessReport};
use picshelf::scan;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Run the full pipeline and return the process report plus the parsed manifest.
fn run_build(source: &Path, output: &Path, force: bool) -> (ProcessReport, serde_json::Value) {
    let config = GalleryConfig::default();
    let report = scan::scan(source).unwrap();
    let backend = RustBackend::new();
    let result = process::process(&backend, &report.images, output, &config, force, None).unwrap();

    let stats = ManifestStats::new(
        result.photos.len() as u32,
        result.stats.thumbnail_bytes,
        result.stats.medium_bytes,
    );
    let builder = result
        .photos
        .iter()
        .cloned()
        .fold(ManifestBuilder::new(), |builder, placed| {
            builder.with(&placed.gallery, &placed.event, placed.record)
        });
    let path = manifest::write_manifest(&builder.finalize(stats), output).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    (result, json)
}

fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

#[test]
fn end_to_end_single_photo() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/sample_1.jpg"), 64, 48);

    let (result, json) = run_build(&source, &output, false);

    assert_eq!(result.stats.processed, 1);
    assert_eq!(result.stats.failed, 0);
    assert!(output.join("images/thumbnails/nature/sample_1.jpg").exists());
    assert!(output.join("images/medium/nature/sample_1.jpg").exists());
    assert!(output.join("images/original/nature/sample_1.jpg").exists());

    assert_eq!(json["version"], "1.0");
    let nature = &json["galleries"]["nature"];
    assert_eq!(nature["title"], "Nature");
    assert_eq!(nature["layout"], "flat");
    let image = &nature["images"][0];
    assert_eq!(image["title"], "Sample 1");
    assert_eq!(image["width"], 64);
    assert_eq!(image["height"], 48);
    assert_eq!(image["orientation"], 1);
    assert_eq!(image["thumbnail"], "/images/thumbnails/nature/sample_1.jpg");
    assert_eq!(json["stats"]["totalImages"], 1);
}

#[test]
fn completeness_every_supported_file_gets_a_record() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/a.jpg"), 32, 32);
    write_jpeg(&source.join("nature/b.jpg"), 32, 32);
    write_jpeg(&source.join("track/race_day/c.jpg"), 32, 32);

    let (result, json) = run_build(&source, &output, false);

    assert_eq!(result.photos.len(), 3);
    for placed in &result.photos {
        let thumb = placed.record.thumbnail.trim_start_matches('/');
        let medium = placed.record.medium.trim_start_matches('/');
        assert!(output.join(thumb).exists(), "missing {thumb}");
        assert!(output.join(medium).exists(), "missing {medium}");
    }
    assert_eq!(json["stats"]["totalImages"], 3);
}

#[test]
fn exclusion_unsupported_and_hidden_files() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/kept.jpg"), 32, 32);
    std::fs::write(source.join("nature/notes.txt"), "not an image").unwrap();
    write_jpeg(&source.join("nature/.hidden.jpg"), 32, 32);

    let (result, json) = run_build(&source, &output, false);

    assert_eq!(result.photos.len(), 1);
    assert!(!output.join("images/thumbnails/nature/notes.jpg").exists());
    assert!(!output.join("images/thumbnails/nature/.hidden.jpg").exists());
    let images = json["galleries"]["nature"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
}

#[test]
fn idempotence_second_run_rewrites_nothing() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/sample_1.jpg"), 64, 48);

    let (_, first_json) = run_build(&source, &output, false);
    let thumb = output.join("images/thumbnails/nature/sample_1.jpg");
    let medium = output.join("images/medium/nature/sample_1.jpg");
    let (thumb_before, medium_before) = (mtime(&thumb), mtime(&medium));

    std::thread::sleep(Duration::from_millis(20));
    let (second, second_json) = run_build(&source, &output, false);

    assert_eq!(second.stats.variants_cached, 3);
    assert_eq!(second.stats.variants_encoded, 0);
    assert_eq!(mtime(&thumb), thumb_before);
    assert_eq!(mtime(&medium), medium_before);

    // Manifest content identical modulo the generation timestamp
    assert_eq!(first_json["galleries"], second_json["galleries"]);
    assert_eq!(first_json["stats"], second_json["stats"]);
}

#[test]
fn incremental_touch_regenerates_only_touched_file() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/a.jpg"), 48, 32);
    write_jpeg(&source.join("nature/b.jpg"), 48, 32);

    run_build(&source, &output, false);
    let thumb_a = output.join("images/thumbnails/nature/a.jpg");
    let thumb_b = output.join("images/thumbnails/nature/b.jpg");
    let (a_before, b_before) = (mtime(&thumb_a), mtime(&thumb_b));

    std::thread::sleep(Duration::from_millis(20));
    write_jpeg(&source.join("nature/a.jpg"), 48, 32);

    let (second, _) = run_build(&source, &output, false);

    assert!(mtime(&thumb_a) > a_before, "touched variant not regenerated");
    assert_eq!(mtime(&thumb_b), b_before, "untouched variant rewritten");
    assert_eq!(second.stats.variants_cached, 3);
}

#[test]
fn sort_order_photos_descend_by_date() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");

    // Staggered mtimes: oldest first
    for name in ["first.jpg", "second.jpg", "third.jpg"] {
        write_jpeg(&source.join("nature").join(name), 32, 32);
        std::thread::sleep(Duration::from_millis(20));
    }

    let (_, json) = run_build(&source, &output, false);

    let images = json["galleries"]["nature"]["images"].as_array().unwrap();
    let dates: Vec<&str> = images
        .iter()
        .map(|i| i["date"].as_str().unwrap())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted, "photos not sorted by date descending");
    assert_eq!(images[0]["title"], "Third");
}

#[test]
fn decode_failure_falls_back_to_byte_copy() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    std::fs::create_dir_all(source.join("nature")).unwrap();
    std::fs::write(source.join("nature/broken.jpg"), b"").unwrap();
    write_jpeg(&source.join("nature/good.jpg"), 32, 32);

    let (result, json) = run_build(&source, &output, false);

    assert_eq!(result.stats.failed, 1);
    assert_eq!(result.stats.processed, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].rel_path, "nature/broken.jpg");

    // Fallback variant is byte-identical to the (empty) source
    let fallback = std::fs::read(output.join("images/thumbnails/nature/broken.jpg")).unwrap();
    assert!(fallback.is_empty());

    // The degraded photo still appears in the manifest with zero dimensions
    let images = json["galleries"]["nature"]["images"].as_array().unwrap();
    let broken = images
        .iter()
        .find(|i| i["original"] == "/images/original/nature/broken.jpg")
        .unwrap();
    assert_eq!(broken["width"], 0);
    assert_eq!(broken["height"], 0);
}

#[test]
fn events_layout_for_nested_directories() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("track/race_day/finish.jpg"), 32, 32);
    write_jpeg(&source.join("track/practice/warmup.jpg"), 32, 32);

    let (_, json) = run_build(&source, &output, false);

    let track = &json["galleries"]["track"];
    assert_eq!(track["layout"], "events");
    assert_eq!(track["events"]["race_day"]["title"], "Race Day");
    assert_eq!(
        track["events"]["race_day"]["photos"][0]["title"],
        "Finish"
    );
    assert_eq!(track["events"]["practice"]["description"], "1 photo");
}

#[test]
fn empty_gallery_directories_omitted_from_manifest() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("nature/a.jpg"), 32, 32);
    std::fs::create_dir_all(source.join("empty_gallery")).unwrap();
    std::fs::create_dir_all(source.join("docs")).unwrap();
    std::fs::write(source.join("docs/readme.txt"), "no images here").unwrap();

    let (_, json) = run_build(&source, &output, false);

    let galleries = json["galleries"].as_object().unwrap();
    assert_eq!(galleries.len(), 1);
    assert!(galleries.contains_key("nature"));
}

#[test]
fn missing_source_root_aborts() {
    let tmp = TempDir::new().unwrap();
    let result = scan::scan(&tmp.path().join("nonexistent"));
    assert!(matches!(result, Err(scan::ScanError::MissingRoot(_))));
}

#[test]
fn exif_orientation_recorded_and_baked() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");

    // Plain JPEG: no EXIF → orientation 1, dimensions pass through
    write_jpeg(&source.join("nature/landscape.jpg"), 80, 60);

    let (_, json) = run_build(&source, &output, false);
    let image = &json["galleries"]["nature"]["images"][0];
    assert_eq!(image["orientation"], 1);

    let (w, h) =
        image::image_dimensions(output.join("images/medium/nature/landscape.jpg")).unwrap();
    assert_eq!((w, h), (80, 60));
}

#[test]
fn variant_paths_mirror_source_tree() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pics");
    let output = tmp.path().join("public");
    write_jpeg(&source.join("track/race_day/best/finish_line.jpg"), 32, 32);

    run_build(&source, &output, false);

    let expected: PathBuf = output.join("images/medium/track/race_day/best/finish_line.jpg");
    assert!(expected.exists());
}
