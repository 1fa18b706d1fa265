//! Ordered volume strategies
//!
//! A target above what an element can natively play needs a gain stage; when
//! that stage cannot be built, the engine degrades to the element's own
//! volume, clamped to its range. Strategies are tried in order and the first
//! one that succeeds decides the outcome.

/// One way of making an element play at a target percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStrategy {
    /// Pin native volume to the captured original and scale through a gain node
    WebAudioGain,

    /// Native volume only: `min(1.0, original * percent / 100)`
    NativeClamped,
}

impl VolumeStrategy {
    /// Gain first, native clamping as the terminal fallback
    pub const DEFAULT_ORDER: [VolumeStrategy; 2] =
        [VolumeStrategy::WebAudioGain, VolumeStrategy::NativeClamped];

    /// Whether this strategy can fail
    pub fn is_fallible(&self) -> bool {
        matches!(self, Self::WebAudioGain)
    }
}

/// What `apply_volume` did to an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppliedVolume {
    /// The element has no adjustable volume
    Skipped,

    /// 100%: native volume restored to the original, any gain reset to 1.0
    Unity,

    /// Native volume pinned to the original, gain node carries the multiplier
    Gain { gain: f32 },

    /// Native volume only, clamped to the element's range
    Native { volume: f64 },
}

impl AppliedVolume {
    /// The strategy that produced this outcome, if any ran
    pub fn strategy(&self) -> Option<VolumeStrategy> {
        match self {
            Self::Gain { .. } => Some(VolumeStrategy::WebAudioGain),
            Self::Native { .. } => Some(VolumeStrategy::NativeClamped),
            Self::Skipped | Self::Unity => None,
        }
    }
}

/// Native volume that approximates `percent` of `original` without exceeding 1.0
pub fn clamped_native_volume(original: f64, percent: u32) -> f64 {
    (original * f64::from(percent) / 100.0).clamp(0.0, 1.0)
}

/// Gain multiplier for `percent`; unbounded above 1.0
pub fn gain_for_percent(percent: u32) -> f32 {
    percent as f32 / 100.0
}
