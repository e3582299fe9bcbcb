//! Per-vertex shading terms. The final vertex color is
//! `tint * face_shade * brightness(smooth_light) * ao`.

use tessera_blocks::MAX_LIGHT;

/// Brightness per occluding probe count (0..=3). Never fully black.
pub const AO_CURVE: [f32; 4] = [1.0, 0.8, 0.65, 0.5];

const FALLOFF: f32 = 0.8;

/// Maps a light level (possibly fractional after smoothing) to linear brightness:
/// `0.8^(15-l)` rescaled so level 0 is black and level 15 is 1.
#[inline]
pub fn brightness(level: f32) -> f32 {
    let max = MAX_LIGHT as f32;
    let l = level.clamp(0.0, max);
    let floor = FALLOFF.powf(max);
    (FALLOFF.powf(max - l) - floor) / (1.0 - floor)
}

/// Occlusion score from the two edge probes and the diagonal probe.
#[inline]
pub fn ao_score(side1: bool, side2: bool, corner: bool) -> usize {
    side1 as usize + side2 as usize + corner as usize
}

#[inline]
pub fn ao_factor(score: usize) -> f32 {
    AO_CURVE[score.min(3)]
}

/// Corner light: the face voxel averaged with its three probes. Probes that are
/// opaque (or unknown) stand in with the face light.
#[inline]
pub fn smooth_light(face: u8, probes: [Option<u8>; 3]) -> f32 {
    let sum: u32 = probes.iter().map(|p| p.unwrap_or(face) as u32).sum::<u32>() + face as u32;
    sum as f32 / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_endpoints_and_monotonic() {
        assert!(brightness(0.0).abs() < 1e-6);
        assert!((brightness(15.0) - 1.0).abs() < 1e-6);
        let mut prev = -1.0;
        for l in 0..=15 {
            let b = brightness(l as f32);
            assert!(b > prev);
            prev = b;
        }
        assert!((brightness(14.0) - (0.8 - 0.8f32.powi(15)) / (1.0 - 0.8f32.powi(15))).abs() < 1e-5);
    }

    #[test]
    fn ao_never_goes_black() {
        for s in 0..=3 {
            assert!(ao_factor(s) > 0.0);
        }
        assert_eq!(ao_score(true, true, false), 2);
        assert!(ao_factor(1) < ao_factor(0));
    }

    #[test]
    fn opaque_probes_use_face_light() {
        assert_eq!(smooth_light(12, [None, None, None]), 12.0);
        assert_eq!(smooth_light(12, [Some(8), None, Some(12)]), 11.0);
    }
}
