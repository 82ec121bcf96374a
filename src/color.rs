//! Hex color decoding and the fixed palette stars are drawn from.
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color must start with `#`")]
    MissingHash,

    #[error("color must have 6 or 8 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("`{0}` is not a valid hex color")]
    InvalidDigit(String),
}

/// An 8-bit per channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    /// Decodes `#RRGGBB` or `#RRGGBBAA`. Each pair of hex digits becomes one channel, alpha
    /// defaults to fully opaque.
    ///
    /// ```
    /// use starfield_engine::color::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex("#1D2B53"), Ok(Rgba::new(29, 43, 83, 255)));
    /// assert_eq!(Rgba::from_hex("#ff004d80"), Ok(Rgba::new(255, 0, 77, 128)));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the leading `#` is missing, the digit count is wrong or a digit is not hex.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').ok_or(ColorError::MissingHash)?;

        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(hex.to_owned()));
        }

        let channel = |index: usize| {
            u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16)
                .map_err(|_| ColorError::InvalidDigit(hex.to_owned()))
        };

        match digits.len() {
            6 => Ok(Self::opaque(channel(0)?, channel(1)?, channel(2)?)),
            8 => Ok(Self::new(channel(0)?, channel(1)?, channel(2)?, channel(3)?)),
            len => Err(ColorError::InvalidLength(len)),
        }
    }

    /// Encodes as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Channels normalized to `0.0..=1.0`, the form most graphics APIs expect.
    #[must_use]
    pub fn to_f32_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|channel| f32::from(channel) / 255.0)
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != u8::MAX {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

/// The 16 colors of the PICO-8 palette, in palette index order.
pub const PICO8_HEX: [&str; 16] = [
    "#000000", "#1D2B53", "#7E2553", "#008751", "#AB5236", "#5F574F", "#C2C3C7", "#FFF1E8",
    "#FF004D", "#FFA300", "#FFEC27", "#00E436", "#29ADFF", "#83769C", "#FF77A8", "#FFCCAA",
];

/// [`PICO8_HEX`] decoded.
pub const PICO8: [Rgba; 16] = [
    Rgba::opaque(0x00, 0x00, 0x00),
    Rgba::opaque(0x1D, 0x2B, 0x53),
    Rgba::opaque(0x7E, 0x25, 0x53),
    Rgba::opaque(0x00, 0x87, 0x51),
    Rgba::opaque(0xAB, 0x52, 0x36),
    Rgba::opaque(0x5F, 0x57, 0x4F),
    Rgba::opaque(0xC2, 0xC3, 0xC7),
    Rgba::opaque(0xFF, 0xF1, 0xE8),
    Rgba::opaque(0xFF, 0x00, 0x4D),
    Rgba::opaque(0xFF, 0xA3, 0x00),
    Rgba::opaque(0xFF, 0xEC, 0x27),
    Rgba::opaque(0x00, 0xE4, 0x36),
    Rgba::opaque(0x29, 0xAD, 0xFF),
    Rgba::opaque(0x83, 0x76, 0x9C),
    Rgba::opaque(0xFF, 0x77, 0xA8),
    Rgba::opaque(0xFF, 0xCC, 0xAA),
];
