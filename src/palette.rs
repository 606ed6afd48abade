use eframe::egui::Color32;

use crate::util::rolling_hash;

const WHITE: Color32 = Color32::from_rgb(255, 255, 255);

const fn rgb(hex: u32) -> Color32 {
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Flag-inspired colour stops for well-known countries.
const FLAG_PALETTES: &[(&str, &[Color32])] = &[
    ("Finland", &[rgb(0x003580), WHITE]),
    ("Denmark", &[rgb(0xc60c30), WHITE]),
    ("Iceland", &[rgb(0x003897), WHITE, rgb(0xd72828)]),
    ("Sweden", &[rgb(0x006aa7), rgb(0xfecc00)]),
    ("Israel", &[rgb(0x0038b8), WHITE]),
    ("Netherlands", &[rgb(0x21468b), WHITE, rgb(0xae1c28)]),
    ("Norway", &[rgb(0xba0c2f), WHITE, rgb(0x00205b)]),
    ("Luxembourg", &[rgb(0x00a1de), WHITE, rgb(0xed2939)]),
    ("Switzerland", &[rgb(0xd52b1e), WHITE]),
    ("Australia", &[rgb(0x00247d), WHITE, rgb(0xe4002b)]),
    ("New Zealand", &[rgb(0x00247d), WHITE, rgb(0xcc142b)]),
    ("Canada", &[rgb(0xff0000), WHITE]),
    ("United States", &[rgb(0x3c3b6e), WHITE, rgb(0xb22234)]),
    ("United Kingdom", &[rgb(0x00247d), WHITE, rgb(0xcf142b)]),
    ("France", &[rgb(0x0055a4), WHITE, rgb(0xef4135)]),
    ("Germany", &[rgb(0x000000), rgb(0xdd0000), rgb(0xffce00)]),
    ("Italy", &[rgb(0x008c45), WHITE, rgb(0xcd212a)]),
    ("Spain", &[rgb(0xaa151b), rgb(0xf1bf00)]),
    ("Japan", &[WHITE, rgb(0xbc002d)]),
    ("China", &[rgb(0xde2910), rgb(0xffde00)]),
    ("India", &[rgb(0xff9933), WHITE, rgb(0x138808), rgb(0x000080)]),
    ("Brazil", &[rgb(0x009739), rgb(0xffcc29), rgb(0x3e4095)]),
    ("Russia", &[WHITE, rgb(0x0039a6), rgb(0xd52b1e)]),
];

/// Colour stops for a country: its flag palette when known, a hashed fallback otherwise.
pub fn palette_for(name: &str) -> Vec<Color32> {
    FLAG_PALETTES
        .iter()
        .find(|(country, _)| *country == name)
        .map(|(_, stops)| stops.to_vec())
        .unwrap_or_else(|| fallback_palette(name))
}

pub fn fallback_palette(name: &str) -> Vec<Color32> {
    let hue = fallback_hue(name);
    vec![
        hsl(hue, 0.70, 0.55),
        hsl((hue + 40.0) % 360.0, 0.60, 0.40),
        hsl((hue + 80.0) % 360.0, 0.50, 0.30),
    ]
}

/// Base hue in whole degrees, `|hash| mod 360`.
fn fallback_hue(name: &str) -> f32 {
    (rolling_hash(name).abs() % 360.0) as f32
}

fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let second = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_country_uses_flag_palette() {
        assert_eq!(palette_for("Japan"), vec![WHITE, rgb(0xbc002d)]);
        assert_eq!(palette_for("India").len(), 4);
    }

    #[test]
    fn fallback_is_a_pure_function_of_the_name() {
        let first = palette_for("Kyrgyzstan");
        assert_eq!(first.len(), 3);
        assert_eq!(first, palette_for("Kyrgyzstan"));
        assert_ne!(first, palette_for("Kazakhstan"));
    }

    #[test]
    fn fallback_hue_follows_the_rolling_hash() {
        assert_eq!(fallback_hue("Kyrgyzstan"), 254.0);
        assert_eq!(fallback_hue("Bosnia and Herzegovina"), 293.0);
        assert_eq!(fallback_hue("Ghana"), 299.0);
        assert_eq!(fallback_palette("Ghana")[0], hsl(299.0, 0.70, 0.55));
    }

    #[test]
    fn hsl_primary_hues() {
        assert_eq!(hsl(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
    }
}
