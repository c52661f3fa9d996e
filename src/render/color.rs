use phf::phf_map;

use crate::calendar::Event;

/// Headers at or above this luma get dark text.
pub const LUMA_THRESHOLD: f64 = 145.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTone {
    Dark,
    Light,
}

impl TextTone {
    pub fn css(self) -> &'static str {
        match self {
            TextTone::Dark => "#000",
            TextTone::Light => "#FFF",
        }
    }
}

pub static NAMED_COLORS: phf::Map<&'static str, &'static str> = phf_map! {
    "red" => "#E53935", "apple" => "#D32F2F", "garnet" => "#9B111E", "pink" => "#EC407A",
    "orange" => "#F4511E", "brown" => "#6D4C41", "copper" => "#B87333",
    "yellow" => "#FDD835", "lemon" => "#FBC02D", "gold" => "#D4AF37", "topaz" => "#FFC54D",
    "green" => "#43A047", "lime" => "#7CB342", "forest" => "#228B22", "emerald" => "#50C878",
    "teal" => "#00897B",
    "blue" => "#1E88E5", "royal" => "#3949AB", "sky" => "#29B6F6", "sapphire" => "#0F52BA",
    "aqua" => "#7FFFD4", "indigo" => "#3949AB", "navy" => "#283593",
    "violet" => "#7E57C2", "purple" => "#5E35B1", "grape" => "#8E24AA", "amethyst" => "#9966CC",
    "black" => "#000000", "obsidian" => "#0D0D0D", "onyx" => "#353839", "gray" => "#9E9E9E",
    "grey" => "#9E9E9E", "silver" => "#C0C0C0", "platinum" => "#E5E4E2", "white" => "#FFFFFF",
    "snow" => "#FFFAFA", "diamond" => "#E6F7FF",
};

// Colours for events that do not name one, picked by a hash of the name.
const PALETTE: &[&str] = &[
    "#E53935", "#EF5350", "#FF7043", "#F4511E", "#FFB300", "#F6BF26", "#FDD835", "#C0CA33",
    "#7CB342", "#66BB6A", "#43A047", "#228B22", "#26A69A", "#00897B", "#00ACC1", "#29B6F6",
    "#039BE5", "#1E88E5", "#3949AB", "#0D47A1", "#5E35B1", "#7E57C2", "#8E24AA", "#AB47BC",
    "#D81B60", "#EC407A", "#6D4C41", "#8D6E63", "#795548", "#5D4037", "#607D8B", "#78909C",
];

/// Parses exactly six hex digits, with or without a leading `#`.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Text tone readable on a header of colour `color`. Unparseable colours
/// get dark text.
pub fn header_contrast(color: &str) -> TextTone {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            if luma >= LUMA_THRESHOLD {
                TextTone::Dark
            } else {
                TextTone::Light
            }
        }
        None => TextTone::Dark,
    }
}

/// Normalizes `#abc`, `#aabbcc` or a colour name to `#AABBCC`.
pub fn resolve_color(color: &str) -> Option<String> {
    let raw = color.trim();
    let hex = raw.strip_prefix('#').unwrap_or(raw);

    if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
        return Some(format!("#{}", doubled.to_ascii_uppercase()));
    }
    if parse_hex(hex).is_some() {
        return Some(format!("#{}", hex.to_ascii_uppercase()));
    }

    NAMED_COLORS
        .get(hex.to_lowercase().as_str())
        .map(|&c| c.to_owned())
}

/// The colour an event is painted with.
pub fn event_color(event: &Event) -> String {
    event
        .color
        .as_deref()
        .and_then(resolve_color)
        .unwrap_or_else(|| PALETTE[stable_hash(&event.name) as usize % PALETTE.len()].to_owned())
}

// djb2 over UTF-16 units with 32 bit wrap-around.
fn stable_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(5381i32, |h, unit| {
            (h << 5).wrapping_add(h).wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayRule;

    #[test]
    fn contrast_extremes() {
        assert_eq!(header_contrast("#FFFFFF"), TextTone::Dark);
        assert_eq!(header_contrast("#000000"), TextTone::Light);
        assert_eq!(header_contrast("notacolor"), TextTone::Dark);
    }

    #[test]
    fn contrast_accepts_bare_and_lowercase() {
        assert_eq!(header_contrast("ffffff"), TextTone::Dark);
        assert_eq!(header_contrast("#696969"), TextTone::Light);
        assert_eq!(header_contrast("#fff"), TextTone::Dark);
    }

    #[test]
    fn contrast_threshold_is_inclusive() {
        // 0.299 * 145 + 0.587 * 145 + 0.114 * 145 == 145
        assert_eq!(header_contrast("#919191"), TextTone::Dark);
        assert_eq!(header_contrast("#909090"), TextTone::Light);
    }

    #[test]
    fn resolves_colors() {
        assert_eq!(resolve_color("#abc").as_deref(), Some("#AABBCC"));
        assert_eq!(resolve_color("ad1457").as_deref(), Some("#AD1457"));
        assert_eq!(resolve_color("Gold").as_deref(), Some("#D4AF37"));
        assert_eq!(resolve_color("#gold").as_deref(), Some("#D4AF37"));
        assert_eq!(resolve_color("#12345"), None);
        assert_eq!(resolve_color("mauve-ish"), None);
    }

    #[test]
    fn event_colors_are_stable() {
        let plain = Event::new("Market Day", 11, DayRule::Single(20));
        assert_eq!(event_color(&plain), event_color(&plain.clone()));
        assert!(PALETTE.contains(&event_color(&plain).as_str()));

        let colored = plain.with_color("navy");
        assert_eq!(event_color(&colored), "#283593");
    }
}
