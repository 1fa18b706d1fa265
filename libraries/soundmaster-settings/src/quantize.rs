//! Magnetic snapping of continuous volume input

use soundmaster_core::SnapSettings;

/// Snap `value` to the first target closer than the threshold, or return it unchanged
///
/// A value exactly `threshold` points away does not snap: with the default
/// threshold of 3, 48 becomes 50 but 53 stays 53.
pub fn snap_volume(value: u32, snap: &SnapSettings) -> u32 {
    snap.targets
        .iter()
        .copied()
        .find(|target| value.abs_diff(*target) < snap.threshold)
        .unwrap_or(value)
}
