//! Visual settings and preferences
//!
//! Loaded from JSON; nothing is persisted by the crate itself.

use serde::{Deserialize, Serialize};

use crate::consts::{AMBIENT_COUNT, BURST_SIZE, CLICK_BURST_SIZE};
use crate::sim::{GameVariant, VisualizerConfig};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Background dust population for this preset
    pub fn ambient_count(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => AMBIENT_COUNT,
            QualityPreset::High => 120,
        }
    }

    /// Fragments per brick/enemy burst
    pub fn burst_size(&self) -> usize {
        match self {
            QualityPreset::Low => 3,
            QualityPreset::Medium => BURST_SIZE,
            QualityPreset::High => 10,
        }
    }

    /// Fragments per click burst
    pub fn click_burst(&self) -> usize {
        match self {
            QualityPreset::Low => CLICK_BURST_SIZE / 2,
            QualityPreset::Medium => CLICK_BURST_SIZE,
            QualityPreset::High => CLICK_BURST_SIZE * 2,
        }
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Cursor trail
    pub trails: bool,
    /// Ambient dust and click bursts
    pub particles: bool,
    /// Glow halos around shapes
    pub glow: bool,

    // === Game ===
    /// Which mini-game the secret code opens
    pub variant: GameVariant,
    /// RNG seed; `None` picks one at startup
    pub seed: Option<u64>,

    // === Accessibility ===
    /// Reduced motion (no glow halos)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            particles: true,
            glow: true,
            variant: GameVariant::Breakout,
            seed: None,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops halos for fill-rate
        if preset == QualityPreset::Low {
            self.glow = false;
        }
    }

    /// Effective glow (respects reduced_motion)
    pub fn effective_glow(&self) -> bool {
        self.glow && !self.reduced_motion
    }

    /// Visualizer populations implied by these settings
    pub fn visualizer_config(&self) -> VisualizerConfig {
        VisualizerConfig {
            ambient_count: self.quality.ambient_count(),
            trails: self.trails,
            particles: self.particles,
            click_burst: self.quality.click_burst(),
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
