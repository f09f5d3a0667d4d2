//! HTML snapshot of a populated document.
//!
//! Used by `carousel-gallery preview --out FILE` to eyeball what the runtime
//! did: which slides each track holds, which are hidden, where each carousel
//! stands, and which backgrounds landed where. The markup follows the page
//! contract (`{category}-carousel` tracks, `data-carousel` buttons,
//! `data-target` service cards) but is not the production page.

use crate::carousel::CarouselRegistry;
use crate::dom::{Document, PageKind, Region, SlideContent, Track, TrackHandle};
use crate::navigation::{self, Direction, HEADER_OFFSET_PX};
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

const CSS: &str = "\
body { font-family: sans-serif; margin: 0; }
section { padding: 2rem; min-height: 8rem; }
.carousel-container { display: flex; align-items: center; gap: .5rem; overflow: hidden; }
.carousel-track { display: flex; flex: 1; transition: transform .5s; }
.carousel-item { min-width: 100%; }
.carousel-item img { width: 100%; }
.carousel-placeholder { border: 2px dashed #aaa; padding: 1rem; }
.service-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.service-card { min-height: 6rem; color: #fff; padding: 1rem; }
";

fn region_style(document: &Document, region: &Region) -> Option<String> {
    document.background(region).map(|style| style.to_css())
}

fn scroll_href(document: &Document, category: &str) -> Option<String> {
    navigation::service_card_target(document.kind(), category, &document.layout().carousels)
        .map(|target| target.href())
}

fn nav_button(category: &str, direction: Direction) -> Markup {
    let label = match direction {
        Direction::Prev => "‹",
        Direction::Next => "›",
    };
    html! {
        button class=(direction.class()) data-carousel=(category) { (label) }
    }
}

fn render_track(track: &Track) -> Markup {
    html! {
        div class="carousel-track" id=(track.id()) style={ "transform: " (track.transform()) } {
            @for slide in track.slides() {
                @match &slide.content {
                    SlideContent::Image { src, alt, origin } => {
                        div class="carousel-item"
                            data-origin=(origin)
                            style=[slide.hidden.then_some("display: none")] {
                            img src=(src) alt=(alt) loading="lazy";
                        }
                    }
                    SlideContent::Placeholder { message } => {
                        div class="carousel-item carousel-placeholder" { (message) }
                    }
                }
            }
        }
    }
}

fn render_carousel_section(
    document: &Document,
    carousels: &CarouselRegistry<TrackHandle>,
    position: usize,
    category: &str,
) -> Markup {
    let track = document.category_track(category);
    let counter = carousels
        .get(category)
        .map(|c| format!("{} / {}", c.current_index() + 1, c.slide_count()));
    html! {
        div class="carousel-section"
            id=(navigation::section_anchor(position))
            style={ "scroll-margin-top: " (HEADER_OFFSET_PX) "px" } {
            h2 { (category) }
            @if let Some(counter) = counter {
                p class="carousel-position" { (counter) }
            }
            div class="carousel-container" {
                (nav_button(category, Direction::Prev))
                @if let Some(track) = track {
                    (render_track(&track.borrow()))
                }
                (nav_button(category, Direction::Next))
            }
        }
    }
}

fn render_index(document: &Document, carousels: &CarouselRegistry<TrackHandle>) -> Markup {
    let categories = &document.layout().carousels;
    html! {
        section class="hero" style=[region_style(document, &Region::Hero)] {
            h1 { "Design.Create.Repeat." }
        }
        section class="services" {
            div class="service-grid" {
                @for category in categories {
                    div class="service-card"
                        data-target=(category)
                        data-scroll=[scroll_href(document, category)]
                        style=[region_style(document, &Region::ServiceCard(category.clone()))] {
                        (category)
                    }
                }
            }
        }
        section id="gallery" {
            @for (i, category) in categories.iter().enumerate() {
                (render_carousel_section(document, carousels, i + 1, category))
            }
        }
        section class="trust-section" style=[region_style(document, &Region::Trust)] {}
        section class="cta-section" style=[region_style(document, &Region::CallToAction)] {}
    }
}

fn render_about(document: &Document) -> Markup {
    html! {
        section class="about-hero" style=[region_style(document, &Region::AboutHero)] {}
        section class="trust-section" style=[region_style(document, &Region::Trust)] {}
        ul class="commitment-list" {
            @for k in 0..document.commitment_items() {
                li style=[region_style(document, &Region::CommitmentItem(k))] {
                    (format!("Commitment {}", k + 1))
                }
            }
        }
    }
}

/// Render the whole document as a standalone HTML page.
pub fn render_document(document: &Document, carousels: &CarouselRegistry<TrackHandle>) -> Markup {
    let (title, content) = match document.kind() {
        PageKind::Index => ("Gallery preview", render_index(document, carousels)),
        PageKind::About => ("About preview", render_about(document)),
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                header class=(if document.header_scrolled() { "header scrolled" } else { "header" }) {
                    "carousel-gallery preview"
                }
                (content)
            }
        }
    }
}

pub fn write_snapshot(path: &Path, markup: Markup) -> Result<(), RenderError> {
    fs::write(path, markup.into_string()).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backgrounds::BackgroundStyle;
    use crate::carousel::Carousel;
    use crate::config::GalleryConfig;
    use crate::device::DeviceProfile;
    use crate::dom::PageLayout;
    use tempfile::TempDir;

    fn signs_config() -> GalleryConfig {
        GalleryConfig {
            categories: vec!["signs".to_string(), "decor".to_string()],
            ..GalleryConfig::default()
        }
    }

    #[test]
    fn index_snapshot_has_page_contract() {
        let config = signs_config();
        let mut doc = Document::from_layout(PageLayout::index(&config));
        let track = doc.category_track("signs").unwrap();
        track
            .borrow_mut()
            .push_image("images/signs/a.png".into(), "signs - a".into(), "images/signs/a.png".into());
        let broken = track
            .borrow_mut()
            .push_image("images/signs/b.png".into(), "signs - b".into(), "images/signs/b.png".into())
            .unwrap();
        track.borrow_mut().hide(broken);
        doc.set_background(
            Region::ServiceCard("signs".to_string()),
            BackgroundStyle::plain("./images/service-signs/x.jpg"),
        );

        let mut carousels = CarouselRegistry::new();
        carousels.insert(
            "signs",
            Carousel::new("signs-carousel", Some(track), &DeviceProfile::desktop()),
        );

        let html = render_document(&doc, &carousels).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"id="signs-carousel""#));
        assert!(html.contains(r#"id="decor-carousel""#));
        assert!(html.contains(r#"class="carousel-next" data-carousel="signs""#));
        assert!(html.contains(r#"data-target="signs""#));
        assert!(html.contains("url('./images/service-signs/x.jpg')"));
        assert!(html.contains(r#"style="display: none""#));
        assert!(html.contains("1 / 1"));
        assert!(html.contains("translateX(0%)"));
        assert!(html.contains(r##"data-scroll="#carousel-section-1""##));
        assert!(html.contains(r#"id="carousel-section-2""#));
        assert!(html.contains("scroll-margin-top: 80px"));
        assert!(html.contains(r#"class="header""#));
    }

    #[test]
    fn scrolled_header_is_marked() {
        let mut doc = Document::from_layout(PageLayout::about());
        doc.set_scroll(200.0);
        let html = render_document(&doc, &CarouselRegistry::new()).into_string();
        assert!(html.contains(r#"class="header scrolled""#));
    }

    #[test]
    fn placeholder_is_rendered() {
        let config = signs_config();
        let doc = Document::from_layout(PageLayout::index(&config));
        doc.category_track("decor")
            .unwrap()
            .borrow_mut()
            .push_placeholder("Add images".to_string());

        let html = render_document(&doc, &CarouselRegistry::new()).into_string();
        assert!(html.contains("carousel-placeholder"));
        assert!(html.contains("Add images"));
    }

    #[test]
    fn about_snapshot_lists_commitments() {
        let doc = Document::from_layout(PageLayout::about());
        let html = render_document(&doc, &CarouselRegistry::new()).into_string();
        assert!(html.contains("about-hero"));
        assert_eq!(html.matches("<li").count(), 4);
        assert!(!html.contains(r#"class="carousel-track""#));
    }

    #[test]
    fn write_snapshot_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("preview.html");
        let doc = Document::from_layout(PageLayout::about());
        write_snapshot(&path, render_document(&doc, &CarouselRegistry::new())).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("About preview"));
    }

    #[test]
    fn write_snapshot_reports_bad_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing/dir/preview.html");
        let doc = Document::from_layout(PageLayout::about());
        let err = write_snapshot(&path, render_document(&doc, &CarouselRegistry::new()));
        assert!(matches!(err, Err(RenderError::Io { .. })));
    }
}
