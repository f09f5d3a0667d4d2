//! End-to-end runtime tests: build a manifest from a real images directory,
//! then initialize a gallery that reads it back through the filesystem source.

use carousel_gallery::carousel::AutoPlay;
use carousel_gallery::config::GalleryConfig;
use carousel_gallery::device::DeviceProfile;
use carousel_gallery::dom::{PageLayout, Region};
use carousel_gallery::gallery::Gallery;
use carousel_gallery::heic::UnavailableConverter;
use carousel_gallery::navigation::NavControl;
use carousel_gallery::scan;
use carousel_gallery::source::FsSource;
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_pixel(3, 3, Rgb([10, 200, 10]))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

fn quick_config() -> GalleryConfig {
    let mut config = GalleryConfig {
        categories: vec!["signs".to_string(), "decor".to_string()],
        ..GalleryConfig::default()
    };
    config.probe.enabled = false;
    config.carousel.settle_ms = 0;
    config.carousel.mobile_settle_ms = 0;
    config.carousel.mobile_stagger_ms = 0;
    config
}

/// `signs` holds three good images, one corrupt JPEG and one HEIC.
fn site(config: &GalleryConfig) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    for name in ["a.png", "b.png", "c.png"] {
        write_png(&images.join("signs").join(name));
    }
    fs::write(images.join("signs/broken.jpg"), b"not a jpeg").unwrap();
    fs::write(images.join("signs/phone.HEIC"), b"heic bytes").unwrap();
    write_png(&images.join("Misc/hero.png"));
    write_png(&images.join("service-signs/card.png"));

    let report = scan::build_manifest(&images, config);
    assert!(!report.has_issues());
    scan::write_manifest(&images, config, &report.manifest).unwrap();
    tmp
}

fn gallery(root: &Path, config: GalleryConfig, profile: DeviceProfile) -> Gallery {
    let layout = PageLayout::index(&config);
    Gallery::new(
        config,
        profile,
        layout,
        Box::new(FsSource::new(root)),
        Box::new(UnavailableConverter),
    )
    .with_seed(11)
}

#[tokio::test]
async fn desktop_page_loads_from_manifest() {
    let config = quick_config();
    let tmp = site(&config);
    let mut gallery = gallery(tmp.path(), config, DeviceProfile::desktop());

    let report = gallery.initialize().await;
    assert!(report.manifest_found);

    let (_, signs) = &report.categories[0];
    assert_eq!(signs.added, 3);
    assert_eq!(signs.hidden, 1);
    // No converter is available, so the HEIC entry is dropped.
    assert_eq!(signs.dropped, 1);
    assert!(!signs.placeholder);

    let (_, decor) = &report.categories[1];
    assert!(decor.placeholder);

    let track = gallery.document().category_track("signs").unwrap();
    assert_eq!(track.borrow().visible_count(), 3);
    assert!(!track.borrow().contains_origin("images/signs/phone.HEIC"));

    let carousel = gallery.carousel("signs").unwrap();
    assert_eq!(carousel.slide_count(), 3);
    assert_eq!(carousel.autoplay(), AutoPlay::Running);

    assert!(gallery.document().background(&Region::Hero).is_some());
    assert!(
        gallery
            .document()
            .background(&Region::ServiceCard("signs".to_string()))
            .is_some()
    );
}

#[tokio::test]
async fn navigation_wraps_over_visible_slides() {
    let config = quick_config();
    let tmp = site(&config);
    let mut gallery = gallery(tmp.path(), config, DeviceProfile::desktop());
    gallery.initialize().await;

    assert!(gallery.handle_nav(&NavControl::prev("signs")));
    assert_eq!(gallery.carousel("signs").unwrap().current_index(), 2);
    for _ in 0..3 {
        gallery.handle_nav(&NavControl::next("signs"));
    }
    assert_eq!(gallery.carousel("signs").unwrap().current_index(), 2);

    let track = gallery.document().category_track("signs").unwrap();
    assert_eq!(track.borrow().transform(), "translateX(-200%)");
}

#[tokio::test]
async fn mobile_page_never_autoplays() {
    let config = quick_config();
    let tmp = site(&config);
    let mut gallery = gallery(tmp.path(), config, DeviceProfile::mobile());

    let report = gallery.initialize().await;
    let (_, signs) = &report.categories[0];
    assert_eq!(signs.dropped, 1);
    assert!(
        gallery
            .carousels()
            .iter()
            .all(|(_, c)| c.autoplay() == AutoPlay::Disabled)
    );
}

#[tokio::test]
async fn missing_manifest_with_probing_finds_conventional_names() {
    let mut config = quick_config();
    config.probe.enabled = true;
    config.probe.max_index = 2;
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("images/signs/signs1.png"));
    write_png(&tmp.path().join("images/signs/2.jpg"));

    let mut gallery = gallery(tmp.path(), config, DeviceProfile::desktop());
    let report = gallery.initialize().await;

    assert!(!report.manifest_found);
    let track = gallery.document().category_track("signs").unwrap();
    assert!(track.borrow().contains_origin("images/signs/signs1.png"));
    assert!(track.borrow().contains_origin("images/signs/2.jpg"));
    assert_eq!(gallery.carousel("signs").unwrap().slide_count(), 2);
    assert!(report.categories[1].1.placeholder);
}
