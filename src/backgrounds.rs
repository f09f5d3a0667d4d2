//! Section and service-card backgrounds.
//!
//! Planning is pure: given the misc entries (or the manifest) and a device
//! profile, produce `(Region, BackgroundStyle)` pairs. [`apply`] then writes
//! them to the document, skipping regions the page does not have.
//!
//! Misc image choice per region:
//!
//! | Region | Image | Overlay |
//! |---|---|---|
//! | Hero | 1 on mobile when ≥2 images, else 0 | black 0.6 → 0.5 |
//! | Trust | mobile 0; desktop 1 when ≥2 images, else 0 | grey 0.7 → 0.6 (mobile 0.77 → 0.66) |
//! | Call to action | 2, only when ≥3 images | black 0.7 → 0.6 |
//! | About hero | 1, only when ≥2 images | black 0.6 → 0.5 |
//! | Commitment item `k` | `k % len` | none |
//!
//! Service cards take the first entry of `{category}-bg` under a flat 50%
//! black overlay.

use crate::device::DeviceProfile;
use crate::dom::{Document, Region};
use crate::types::{ImageEntry, Manifest};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Fixed,
    Scroll,
}

impl Attachment {
    pub fn for_profile(profile: &DeviceProfile) -> Self {
        if profile.supports_fixed_background {
            Attachment::Fixed
        } else {
            Attachment::Scroll
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            Attachment::Fixed => "fixed",
            Attachment::Scroll => "scroll",
        }
    }
}

/// Gradient layered above the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// 135° gradient between two colors.
    Diagonal { from: String, to: String },
    /// Single color over the whole image.
    Flat(String),
}

impl Overlay {
    fn diagonal(from: &str, to: &str) -> Self {
        Overlay::Diagonal {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn to_css(&self) -> String {
        match self {
            Overlay::Diagonal { from, to } => {
                format!("linear-gradient(135deg, {from} 0%, {to} 100%)")
            }
            Overlay::Flat(color) => format!("linear-gradient({color}, {color})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundStyle {
    pub image_url: String,
    pub overlay: Option<Overlay>,
    pub size: Option<String>,
    pub position: Option<String>,
    pub attachment: Option<Attachment>,
    pub repeat: Option<String>,
}

impl BackgroundStyle {
    /// Just the image, no overlay or sizing.
    pub fn plain(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            overlay: None,
            size: None,
            position: None,
            attachment: None,
            repeat: None,
        }
    }

    fn covered(image_url: String, overlay: Overlay) -> Self {
        Self {
            overlay: Some(overlay),
            size: Some("cover".to_string()),
            position: Some("center".to_string()),
            ..Self::plain(image_url)
        }
    }

    /// `background-image` value, overlay first.
    pub fn image_css(&self) -> String {
        let url = format!("url('{}')", self.image_url);
        match &self.overlay {
            Some(overlay) => format!("{}, {}", overlay.to_css(), url),
            None => url,
        }
    }

    /// Inline style declarations.
    pub fn to_css(&self) -> String {
        let mut decls = vec![format!("background-image: {}", self.image_css())];
        if let Some(size) = &self.size {
            decls.push(format!("background-size: {size}"));
        }
        if let Some(position) = &self.position {
            decls.push(format!("background-position: {position}"));
        }
        if let Some(attachment) = self.attachment {
            decls.push(format!("background-attachment: {}", attachment.as_css()));
        }
        if let Some(repeat) = &self.repeat {
            decls.push(format!("background-repeat: {repeat}"));
        }
        decls.join("; ")
    }
}

/// Absolute and remote paths stay; anything else becomes `./path`.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with("http") || path.starts_with('/') {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

/// Percent-encode each path segment, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Backgrounds for the hero, trust, call-to-action, about-hero and
/// commitment regions, from the misc images.
pub fn plan_section_backgrounds(
    images: &[ImageEntry],
    profile: &DeviceProfile,
    commitment_items: usize,
) -> Vec<(Region, BackgroundStyle)> {
    let mut plan = Vec::new();
    if images.is_empty() {
        return plan;
    }
    let attachment = Some(Attachment::for_profile(profile));
    let len = images.len();

    let hero_index = if profile.is_mobile() && len > 1 { 1 } else { 0 };
    let mut hero = BackgroundStyle::covered(
        normalize_path(&images[hero_index].path),
        Overlay::diagonal("rgba(0, 0, 0, 0.6)", "rgba(0, 0, 0, 0.5)"),
    );
    hero.attachment = attachment;
    plan.push((Region::Hero, hero));

    let trust = if profile.is_mobile() {
        BackgroundStyle {
            image_url: normalize_path(&images[0].path),
            overlay: Some(Overlay::diagonal(
                "rgba(50, 50, 50, 0.77)",
                "rgba(40, 40, 40, 0.66)",
            )),
            size: Some("cover, 225% auto".to_string()),
            position: Some("center calc(50% + 25px), center calc(50% - 50px)".to_string()),
            attachment,
            repeat: Some("no-repeat".to_string()),
        }
    } else {
        let index = if len > 1 { 1 } else { 0 };
        let mut style = BackgroundStyle::covered(
            normalize_path(&images[index].path),
            Overlay::diagonal("rgba(50, 50, 50, 0.7)", "rgba(40, 40, 40, 0.6)"),
        );
        style.attachment = attachment;
        style
    };
    plan.push((Region::Trust, trust));

    if let Some(entry) = images.get(2) {
        let mut cta = BackgroundStyle::covered(
            entry.path.clone(),
            Overlay::diagonal("rgba(0, 0, 0, 0.7)", "rgba(0, 0, 0, 0.6)"),
        );
        cta.attachment = attachment;
        plan.push((Region::CallToAction, cta));
    }

    if let Some(entry) = images.get(1) {
        let mut about = BackgroundStyle::covered(
            entry.path.clone(),
            Overlay::diagonal("rgba(0, 0, 0, 0.6)", "rgba(0, 0, 0, 0.5)"),
        );
        about.attachment = attachment;
        plan.push((Region::AboutHero, about));
    }

    for k in 0..commitment_items {
        let entry = &images[k % len];
        plan.push((
            Region::CommitmentItem(k),
            BackgroundStyle::plain(entry.path.clone()),
        ));
    }

    plan
}

/// One background per service card whose `{category}-bg` key has entries.
pub fn plan_service_card_backgrounds(
    manifest: &Manifest,
    categories: &[String],
) -> Vec<(Region, BackgroundStyle)> {
    categories
        .iter()
        .filter_map(|category| {
            let key = format!("{category}-bg");
            let Some(first) = manifest.entries(&key).first() else {
                debug!(category = %category, key = %key, "no service card background");
                return None;
            };
            let style = BackgroundStyle {
                repeat: Some("no-repeat".to_string()),
                ..BackgroundStyle::covered(
                    normalize_path(&encode_path(&first.path)),
                    Overlay::Flat("rgba(0, 0, 0, 0.5)".to_string()),
                )
            };
            Some((Region::ServiceCard(category.clone()), style))
        })
        .collect()
}

/// Write a plan to the document. Returns how many regions took a background.
pub fn apply(document: &mut Document, plan: Vec<(Region, BackgroundStyle)>) -> usize {
    let mut applied = 0;
    for (region, style) in plan {
        let url = style.image_url.clone();
        if document.set_background(region.clone(), style) {
            info!(region = ?region, url = %url, "applied background");
            applied += 1;
        } else {
            debug!(region = ?region, "region not on page");
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::dom::PageLayout;

    fn misc(n: usize) -> Vec<ImageEntry> {
        (0..n)
            .map(|i| ImageEntry::new(format!("images/Misc/bg{i}.jpg"), format!("Background - bg{i}")))
            .collect()
    }

    fn style_for(plan: &[(Region, BackgroundStyle)], region: &Region) -> Option<BackgroundStyle> {
        plan.iter()
            .find(|(r, _)| r == region)
            .map(|(_, s)| s.clone())
    }

    #[test]
    fn no_images_no_plan() {
        assert!(plan_section_backgrounds(&[], &DeviceProfile::desktop(), 4).is_empty());
    }

    #[test]
    fn desktop_hero_uses_first_image_fixed() {
        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::desktop(), 0);
        let hero = style_for(&plan, &Region::Hero).unwrap();
        assert_eq!(hero.image_url, "./images/Misc/bg0.jpg");
        assert_eq!(hero.attachment, Some(Attachment::Fixed));
        assert_eq!(
            hero.image_css(),
            "linear-gradient(135deg, rgba(0, 0, 0, 0.6) 0%, rgba(0, 0, 0, 0.5) 100%), url('./images/Misc/bg0.jpg')"
        );
    }

    #[test]
    fn mobile_hero_uses_second_image_when_available() {
        let plan = plan_section_backgrounds(&misc(2), &DeviceProfile::mobile(), 0);
        let hero = style_for(&plan, &Region::Hero).unwrap();
        assert_eq!(hero.image_url, "./images/Misc/bg1.jpg");
        assert_eq!(hero.attachment, Some(Attachment::Scroll));

        let plan = plan_section_backgrounds(&misc(1), &DeviceProfile::mobile(), 0);
        let hero = style_for(&plan, &Region::Hero).unwrap();
        assert_eq!(hero.image_url, "./images/Misc/bg0.jpg");
    }

    #[test]
    fn trust_section_mobile_and_desktop() {
        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::mobile(), 0);
        let trust = style_for(&plan, &Region::Trust).unwrap();
        assert_eq!(trust.image_url, "./images/Misc/bg0.jpg");
        assert_eq!(trust.size.as_deref(), Some("cover, 225% auto"));
        assert_eq!(trust.repeat.as_deref(), Some("no-repeat"));
        assert!(trust.image_css().contains("rgba(50, 50, 50, 0.77)"));

        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::desktop(), 0);
        let trust = style_for(&plan, &Region::Trust).unwrap();
        assert_eq!(trust.image_url, "./images/Misc/bg1.jpg");
        assert_eq!(trust.size.as_deref(), Some("cover"));
        assert!(trust.image_css().contains("rgba(50, 50, 50, 0.7)"));

        let plan = plan_section_backgrounds(&misc(1), &DeviceProfile::desktop(), 0);
        let trust = style_for(&plan, &Region::Trust).unwrap();
        assert_eq!(trust.image_url, "./images/Misc/bg0.jpg");
    }

    #[test]
    fn cta_and_about_need_enough_images() {
        let plan = plan_section_backgrounds(&misc(2), &DeviceProfile::desktop(), 0);
        assert!(style_for(&plan, &Region::CallToAction).is_none());
        let about = style_for(&plan, &Region::AboutHero).unwrap();
        assert_eq!(about.image_url, "images/Misc/bg1.jpg");

        let plan = plan_section_backgrounds(&misc(1), &DeviceProfile::desktop(), 0);
        assert!(style_for(&plan, &Region::AboutHero).is_none());

        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::desktop(), 0);
        let cta = style_for(&plan, &Region::CallToAction).unwrap();
        assert_eq!(cta.image_url, "images/Misc/bg2.jpg");
    }

    #[test]
    fn commitment_items_cycle_through_images() {
        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::desktop(), 4);
        let urls: Vec<_> = (0..4)
            .map(|k| style_for(&plan, &Region::CommitmentItem(k)).unwrap().image_url)
            .collect();
        assert_eq!(
            urls,
            [
                "images/Misc/bg0.jpg",
                "images/Misc/bg1.jpg",
                "images/Misc/bg2.jpg",
                "images/Misc/bg0.jpg"
            ]
        );
        let item = style_for(&plan, &Region::CommitmentItem(0)).unwrap();
        assert!(item.overlay.is_none());
        assert_eq!(item.to_css(), "background-image: url('images/Misc/bg0.jpg')");
    }

    #[test]
    fn normalize_path_rules() {
        assert_eq!(normalize_path("images/a.jpg"), "./images/a.jpg");
        assert_eq!(normalize_path("/images/a.jpg"), "/images/a.jpg");
        assert_eq!(normalize_path("https://cdn.example/a.jpg"), "https://cdn.example/a.jpg");
    }

    #[test]
    fn service_cards_use_first_encoded_entry() {
        let mut manifest = Manifest::new();
        manifest.insert(
            "signs-bg",
            vec![
                ImageEntry::new("images/service-signs/neon sign.jpg", "signs-bg - neon sign"),
                ImageEntry::new("images/service-signs/other.jpg", "signs-bg - other"),
            ],
        );
        manifest.insert("decor-bg", vec![]);

        let categories = vec!["signs".to_string(), "decor".to_string()];
        let plan = plan_service_card_backgrounds(&manifest, &categories);
        assert_eq!(plan.len(), 1);

        let (region, style) = &plan[0];
        assert_eq!(region, &Region::ServiceCard("signs".to_string()));
        assert_eq!(style.image_url, "./images/service-signs/neon%20sign.jpg");
        assert_eq!(
            style.to_css(),
            "background-image: linear-gradient(rgba(0, 0, 0, 0.5), rgba(0, 0, 0, 0.5)), \
             url('./images/service-signs/neon%20sign.jpg'); background-size: cover; \
             background-position: center; background-repeat: no-repeat"
        );
    }

    #[test]
    fn apply_skips_missing_regions() {
        let mut doc = Document::from_layout(PageLayout::index(&GalleryConfig::default()));
        let plan = plan_section_backgrounds(&misc(3), &DeviceProfile::desktop(), 4);
        // Index page: hero, trust, cta. No about hero, no commitment items.
        assert_eq!(apply(&mut doc, plan), 3);
        assert!(doc.background(&Region::Hero).is_some());
        assert!(doc.background(&Region::AboutHero).is_none());
    }

    #[test]
    fn about_page_gets_commitment_backgrounds() {
        let mut doc = Document::from_layout(PageLayout::about());
        let plan = plan_section_backgrounds(&misc(2), &DeviceProfile::desktop(), doc.commitment_items());
        // about hero, trust, four commitment items
        assert_eq!(apply(&mut doc, plan), 6);
    }
}
