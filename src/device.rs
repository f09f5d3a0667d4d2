//! Device capability profile.
//!
//! Behavior that differs between phones and desktops (auto-play, HEIC
//! conversion, background attachment, image choice for hero sections) keys off
//! a [`DeviceProfile`] computed once and passed to the components that need it.

/// What the current device can do, as far as the gallery cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Primary input is touch. Treated as "mobile": no auto-play, no HEIC
    /// conversion, alternate hero/trust images.
    pub touch_primary: bool,
    /// `background-attachment: fixed` renders correctly and cheaply.
    pub supports_fixed_background: bool,
    /// The user asked for reduced motion; auto-play stays off.
    pub prefers_reduced_motion: bool,
}

/// User-agent fragments that mark a handheld browser.
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceProfile {
    pub const fn desktop() -> Self {
        Self {
            touch_primary: false,
            supports_fixed_background: true,
            prefers_reduced_motion: false,
        }
    }

    pub const fn mobile() -> Self {
        Self {
            touch_primary: true,
            supports_fixed_background: false,
            prefers_reduced_motion: false,
        }
    }

    /// Classify from a user-agent string.
    ///
    /// Kept for callers that only have the UA; prefer building the profile from
    /// real capability queries when they are available.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
            Self::mobile()
        } else {
            Self::desktop()
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.prefers_reduced_motion = reduced;
        self
    }

    pub fn is_mobile(&self) -> bool {
        self.touch_primary
    }

    pub fn autoplay_allowed(&self) -> bool {
        !self.touch_primary && !self.prefers_reduced_motion
    }

    /// HEIC conversion is never attempted on touch-primary devices.
    pub fn converts_heic(&self) -> bool {
        !self.touch_primary
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::desktop()
    }
}
