//! The fixed glyph palette and nearest-pattern classification.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// One glyph the downstream renderer can draw: the byte emitted into the
/// stream plus the intensity pattern of its four quadrants (top-left,
/// top-right, bottom-left, bottom-right).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub code: u8,
    pub pattern: [f32; 4],
}

/// Ordered set of glyphs available to the classifier.
///
/// Order is significant: when two patterns are equidistant from a sampled
/// cell, the earlier entry wins. The palette is fixed for the lifetime of an
/// encoding run.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(anyhow!("palette is empty; at least one glyph is required"));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.code == entry.code) {
                return Err(anyhow!("palette defines glyph code {} twice", entry.code));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Glyph code whose pattern has the smallest L1 distance to the sampled
    /// quadrant intensities. Pure; ties keep the earliest entry.
    pub fn classify(&self, quarters: &[f64; 4]) -> u8 {
        let mut best = self.entries[0].code;
        let mut fit = f64::INFINITY;
        for entry in &self.entries {
            let dist: f64 = quarters
                .iter()
                .zip(entry.pattern.iter())
                .map(|(q, &p)| (q - p as f64).abs())
                .sum();
            if dist < fit {
                best = entry.code;
                fit = dist;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: u8, pattern: [f32; 4]) -> PaletteEntry {
        PaletteEntry { code, pattern }
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::new()).is_err());
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let entries = vec![entry(7, [0.0; 4]), entry(7, [255.0; 4])];
        assert!(Palette::new(entries).is_err());
    }

    #[test]
    fn picks_nearest_pattern() {
        let palette = Palette::new(vec![
            entry(0, [0.0, 0.0, 0.0, 0.0]),
            entry(1, [255.0, 255.0, 255.0, 255.0]),
        ])
        .unwrap();
        assert_eq!(palette.classify(&[250.0, 240.0, 245.0, 252.0]), 1);
        assert_eq!(palette.classify(&[5.0, 15.0, 10.0, 3.0]), 0);
    }

    #[test]
    fn ties_keep_the_earlier_entry() {
        let palette = Palette::new(vec![
            entry(5, [100.0, 100.0, 100.0, 100.0]),
            entry(9, [100.0, 100.0, 100.0, 100.0]),
        ])
        .unwrap();
        assert_eq!(palette.classify(&[80.0, 120.0, 90.0, 110.0]), 5);
    }

    #[test]
    fn classification_is_deterministic() {
        let palette = Palette::new(vec![
            entry(0, [0.0, 0.0, 0.0, 0.0]),
            entry(219, [255.0, 255.0, 255.0, 255.0]),
            entry(220, [0.0, 0.0, 255.0, 255.0]),
        ])
        .unwrap();
        let quarters = [12.0, 30.0, 200.0, 180.0];
        assert_eq!(palette.classify(&quarters), palette.classify(&quarters));
    }
}
