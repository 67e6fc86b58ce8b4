//! Shared configuration types for kztracker.
//!
//! Everything here is plain serde data so it can be persisted by the core
//! crate and read by the binary without pulling in the tracker runtime.

use serde::{Deserialize, Serialize};

/// RGBA color
pub type Color = [u8; 4];

// ─────────────────────────────────────────────────────────────────────────────
// Color Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic color of a display row.
///
/// The palette is fixed; sinks map a token to whatever their renderer needs
/// via [`ColorToken::hex`] or [`ColorToken::rgba`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    /// Idle / waiting
    #[default]
    Default,
    /// Attention needed
    Warning,
    /// Urgent
    Alert,
    /// Action in progress
    Active,
    /// Player names
    Player,
}

pub mod palette {
    use super::Color;

    pub const DEFAULT: Color = [0xCC, 0xCC, 0xCC, 255];
    pub const WARNING: Color = [0xFF, 0xDD, 0x66, 255];
    pub const ALERT: Color = [0xFF, 0x77, 0x44, 255];
    pub const ACTIVE: Color = [0x99, 0xDD, 0x66, 255];
    pub const PLAYER: Color = [0x6E, 0xA0, 0xFF, 255];
}

impl ColorToken {
    pub const ALL: [ColorToken; 5] = [
        ColorToken::Default,
        ColorToken::Warning,
        ColorToken::Alert,
        ColorToken::Active,
        ColorToken::Player,
    ];

    pub fn rgba(self) -> Color {
        match self {
            ColorToken::Default => palette::DEFAULT,
            ColorToken::Warning => palette::WARNING,
            ColorToken::Alert => palette::ALERT,
            ColorToken::Active => palette::ACTIVE,
            ColorToken::Player => palette::PLAYER,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Default => "#CCCCCC",
            ColorToken::Warning => "#FFDD66",
            ColorToken::Alert => "#FF7744",
            ColorToken::Active => "#99DD66",
            ColorToken::Player => "#6EA0FF",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Inclusive validation range for a numeric setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> SettingRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

pub mod overlay_ranges {
    use super::SettingRange;

    pub const X: SettingRange<i32> = SettingRange::new(0, 3840);
    pub const Y: SettingRange<i32> = SettingRange::new(0, 2160);
    pub const WIDTH: SettingRange<u32> = SettingRange::new(150, 600);
    pub const HEIGHT: SettingRange<u32> = SettingRange::new(60, 300);
    pub const OPACITY: SettingRange<f32> = SettingRange::new(0.3, 1.0);
    pub const FONT_SIZE: SettingRange<u8> = SettingRange::new(8, 20);
}

/// Position and appearance of the two-row phase overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Centered by the renderer on first run when 0
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub locked: bool,
    pub transparent_bg: bool,
    pub opacity: f32,
    pub font_size: u8,
    /// Remembers whether the user hid the overlay
    pub visible: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            x: 0,
            y: 50,
            width: 210,
            height: 75,
            locked: false,
            transparent_bg: false,
            opacity: 0.90,
            font_size: 11,
            visible: true,
        }
    }
}

impl OverlaySettings {
    /// Clamp every numeric field into its validation range.
    ///
    /// A non-finite opacity falls back to the default.
    pub fn validated(mut self) -> Self {
        self.x = overlay_ranges::X.clamp(self.x);
        self.y = overlay_ranges::Y.clamp(self.y);
        self.width = overlay_ranges::WIDTH.clamp(self.width);
        self.height = overlay_ranges::HEIGHT.clamp(self.height);
        self.opacity = if self.opacity.is_finite() {
            overlay_ranges::OPACITY.clamp(self.opacity)
        } else {
            Self::default().opacity
        };
        self.font_size = overlay_ranges::FONT_SIZE.clamp(self.font_size);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tailer Settings
// ─────────────────────────────────────────────────────────────────────────────

pub mod tailer_ranges {
    use super::SettingRange;

    pub const POLL_INTERVAL_MS: SettingRange<u64> = SettingRange::new(10, 1_000);
    pub const RESCAN_INTERVAL_SECS: SettingRange<u64> = SettingRange::new(1, 600);
    pub const STOP_TIMEOUT_MS: SettingRange<u64> = SettingRange::new(100, 10_000);
    pub const DISPLAY_INTERVAL_MS: SettingRange<u64> = SettingRange::new(10, 1_000);
}

/// Cadence of the combat log worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailerSettings {
    /// Sleep between worker iterations
    pub poll_interval_ms: u64,
    /// How often the folder is rescanned for a newer log
    pub rescan_interval_secs: u64,
    /// Upper bound on how long `stop()` waits for the worker
    pub stop_timeout_ms: u64,
}

impl Default for TailerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            rescan_interval_secs: 30,
            stop_timeout_ms: 2_000,
        }
    }
}

impl TailerSettings {
    pub fn validated(self) -> Self {
        Self {
            poll_interval_ms: tailer_ranges::POLL_INTERVAL_MS.clamp(self.poll_interval_ms),
            rescan_interval_secs: tailer_ranges::RESCAN_INTERVAL_SECS
                .clamp(self.rescan_interval_secs),
            stop_timeout_ms: tailer_ranges::STOP_TIMEOUT_MS.clamp(self.stop_timeout_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

fn default_display_interval_ms() -> u64 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Game folder containing `CombatLog*.txt` files
    #[serde(default)]
    pub log_directory: String,
    /// How often the driver polls the phase clock
    #[serde(default = "default_display_interval_ms")]
    pub display_interval_ms: u64,
    #[serde(default)]
    pub tailer: TailerSettings,
    #[serde(default)]
    pub overlay: OverlaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_directory: String::new(),
            display_interval_ms: default_display_interval_ms(),
            tailer: TailerSettings::default(),
            overlay: OverlaySettings::default(),
        }
    }
}

impl AppConfig {
    pub fn with_log_directory(log_directory: String) -> Self {
        Self {
            log_directory,
            ..Default::default()
        }
    }

    /// Clamp all nested settings into their valid ranges.
    pub fn validated(self) -> Self {
        Self {
            log_directory: self.log_directory,
            display_interval_ms: tailer_ranges::DISPLAY_INTERVAL_MS
                .clamp(self.display_interval_ms),
            tailer: self.tailer.validated(),
            overlay: self.overlay.validated(),
        }
    }
}
