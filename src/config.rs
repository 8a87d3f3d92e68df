use std::time::Duration;

/// Gains and bounds of every pointer and scroll mapping on the site.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionConfig {
    /// Hero card tilt bound in degrees
    pub hero_tilt: f32,
    /// Project card tilt bound in degrees
    pub card_tilt: f32,
    /// How far a hovered project card rises toward the viewer
    pub card_lift: f32,
    /// Pointer offset divisor of the magnetic button
    pub magnetic_strength: f32,
    /// Hero glow shift at the end of the hero section, in pixels
    pub glow_shift: f32,
    /// Depth step between motion bands
    pub band_depth: f32,
    /// Depth step between parallax scene bands
    pub scene_depth: f32,
    pub parallax_amplitude: f32,
    /// Catch-up time of scroll-linked drift, in milliseconds
    pub scrub_follow_ms: f32,
    /// Backdrop camera rotation at the viewport edge, radians
    pub camera_follow_gain: f32,
    /// Fraction of the remaining camera rotation closed per frame
    pub camera_damping: f32,
    /// Model rotation at the viewport edge (horizontal, vertical), radians
    pub model_follow_gain: (f32, f32),
    pub model_damping: f32,
    /// Particle field rotation per frame (y, x), radians
    pub particle_drift: (f32, f32),
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            hero_tilt: 12.0,
            card_tilt: 10.0,
            card_lift: 18.0,
            magnetic_strength: 20.0,
            glow_shift: 90.0,
            band_depth: 0.18,
            scene_depth: 0.12,
            parallax_amplitude: 120.0,
            scrub_follow_ms: 500.0,
            camera_follow_gain: 0.25,
            camera_damping: 0.05,
            model_follow_gain: (0.4, 0.12),
            model_damping: 0.03,
            particle_drift: (0.00045, 0.00022),
        }
    }
}

/// Page and runtime settings.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub width: f32,
    pub height: f32,
    pub frame_interval: Duration,
    /// Frames to run before stopping; `None` runs until stopped
    pub frame_budget: Option<u64>,
    /// Seed for the particle field and the hero chips
    pub seed: u64,
    pub particle_count: usize,
    pub model_path: String,
    pub motion: MotionConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            frame_interval: Duration::from_millis(16),
            frame_budget: None,
            seed: 0x6e65_6275_6c61,
            particle_count: 8000,
            model_path: "/models/logo.glb".to_string(),
            motion: MotionConfig::default(),
        }
    }
}
