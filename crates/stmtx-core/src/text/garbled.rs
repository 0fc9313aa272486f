//! Detection of text layers corrupted by mis-decoded font encodings.

/// Typographic and ligature glyphs that dominate mis-decoded font output.
const SUSPECT_SYMBOLS: &[char] = &[
    '¢', '†', 'ƒ', '⁄', '¶', '…', '§', '•', 'ﬂ', '¤', '›', '‹', 'ﬁ', '‡', '°',
];

/// Sequences that only appear in text that failed to decode.
const CORRUPTION_MARKERS: &[&str] = &["???", "ï¿½", "\u{FFFD}"];

/// Classifies a text sample as usable or garbled.
///
/// A sample is garbled when it contains a corruption marker, when the share
/// of non-ASCII characters exceeds `non_ascii_threshold`, or when the share of
/// suspect symbols exceeds `symbol_threshold`. Empty samples are never garbled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarbledTextDetector {
    non_ascii_threshold: f64,
    symbol_threshold: f64,
}

impl GarbledTextDetector {
    pub fn new(non_ascii_threshold: f64, symbol_threshold: f64) -> Self {
        Self {
            non_ascii_threshold,
            symbol_threshold,
        }
    }

    /// Threshold used on a first-page sample before table-aware parsing.
    pub fn page_sample() -> Self {
        Self::new(0.2, 0.1)
    }

    /// Threshold used on the leading lines of a text layer.
    pub fn line_sample() -> Self {
        Self::new(0.3, 0.1)
    }

    pub fn non_ascii_threshold(&self) -> f64 {
        self.non_ascii_threshold
    }

    pub fn is_garbled(&self, sample: &str) -> bool {
        if sample.is_empty() {
            return false;
        }

        if CORRUPTION_MARKERS.iter().any(|m| sample.contains(m)) {
            return true;
        }

        if non_ascii_ratio(sample) > self.non_ascii_threshold {
            return true;
        }

        let total = sample.chars().count() as f64;
        let symbols = sample.chars().filter(|c| SUSPECT_SYMBOLS.contains(c)).count() as f64;
        symbols / total > self.symbol_threshold
    }
}

impl Default for GarbledTextDetector {
    fn default() -> Self {
        Self::line_sample()
    }
}

/// Share of characters above U+007F. Zero for empty input.
pub fn non_ascii_ratio(sample: &str) -> f64 {
    let (total, non_ascii) = sample
        .chars()
        .fold((0usize, 0usize), |(t, n), c| (t + 1, n + usize::from(!c.is_ascii())));

    if total == 0 {
        0.0
    } else {
        non_ascii as f64 / total as f64
    }
}
