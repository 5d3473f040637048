/// LED color a `Led` feedback can request, and an LED device can advertise support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ColorTag {
    White,
    Red,
    Green,
    Blue,
    /// Vendor "flash" color — a dedicated high-intensity notification channel.
    Flash,
    Rgb(u8, u8, u8),
}

impl ColorTag {
    /// Parse the theme-file color string: a bare name or `#RRGGBB`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "white" => Some(ColorTag::White),
            "red" => Some(ColorTag::Red),
            "green" => Some(ColorTag::Green),
            "blue" => Some(ColorTag::Blue),
            "FLASH" | "flash" => Some(ColorTag::Flash),
            hex if hex.starts_with('#') && hex.len() == 7 => {
                let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
                let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
                let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
                Some(ColorTag::Rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// The (r, g, b) triple this color maps to on a multicolor LED channel.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorTag::White => (255, 255, 255),
            ColorTag::Red => (255, 0, 0),
            ColorTag::Green => (0, 255, 0),
            ColorTag::Blue => (0, 0, 255),
            ColorTag::Flash => (255, 255, 255),
            ColorTag::Rgb(r, g, b) => (r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_colors() {
        assert_eq!(ColorTag::parse("red"), Some(ColorTag::Red));
        assert_eq!(ColorTag::parse("FLASH"), Some(ColorTag::Flash));
        assert_eq!(ColorTag::parse("purple"), None);
    }

    #[test]
    fn parse_hex_color() {
        assert_eq!(ColorTag::parse("#112233"), Some(ColorTag::Rgb(0x11, 0x22, 0x33)));
        assert_eq!(ColorTag::parse("#zzzzzz"), None);
        assert_eq!(ColorTag::parse("#1234"), None);
    }

    #[test]
    fn rgb_mapping() {
        assert_eq!(ColorTag::Red.rgb(), (255, 0, 0));
        assert_eq!(ColorTag::Rgb(10, 20, 30).rgb(), (10, 20, 30));
    }
}
