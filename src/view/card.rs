//! Demo cards with deterministic pseudo-random heights.

use super::constants::{MAX_CARD_ROWS, MIN_CARD_ROWS, ROW_PX};
use crate::list::CellContent;
use crate::model::BoxSize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ADJECTIVES: [&str; 8] = [
    "Quiet", "Amber", "Shifting", "Lucent", "Hollow", "Northern", "Café", "Slow",
];
const NOUNS: [&str; 8] = [
    "Harbor", "Meridian", "Orchard", "Signal", "Lantern", "Delta", "Ridge", "Atlas",
];

/// One card of the demo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position within its column.
    pub index: usize,
    /// Card title.
    pub title: String,
    /// Body lines.
    pub body: Vec<String>,
    /// Rendered height in terminal rows, borders included.
    pub rows: u16,
}

impl CellContent for Card {
    fn intrinsic_size(&self, available_width: f64) -> BoxSize {
        BoxSize::new(available_width, f64::from(self.rows) * ROW_PX)
    }
}

/// SplitMix64 step; stable across platforms and releases.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generate `count` cards for column `seed`.
pub fn generate(seed: u64, count: usize) -> Vec<Card> {
    let span = u64::from(MAX_CARD_ROWS - MIN_CARD_ROWS + 1);
    (0..count)
        .map(|index| {
            let roll = mix(seed.wrapping_mul(1_000_003).wrapping_add(index as u64));
            let rows = MIN_CARD_ROWS + (roll % span) as u16;
            let adjective = ADJECTIVES[(roll >> 8) as usize % ADJECTIVES.len()];
            let noun = NOUNS[(roll >> 16) as usize % NOUNS.len()];
            // Border and title take two rows.
            let body = (0..rows.saturating_sub(2))
                .map(|line| format!("line {} of {}", line + 1, rows - 2))
                .collect();
            Card {
                index,
                title: format!("#{index} {adjective} {noun}"),
                body,
                rows,
            }
        })
        .collect()
}

/// Truncate `text` to at most `max_width` display columns.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}
