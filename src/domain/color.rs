// Color model shared by the renderers

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rrggbb`. Anything else falls back to mid grey.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 {
            return Self::rgb(0x55, 0x55, 0x55);
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0x55);
        Self::rgb(channel(0), channel(2), channel(4))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear blend towards `other`, `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0x11, 0x11, 0x11);
    pub const GRID: Color = Color::rgb(0x22, 0x22, 0x22);
    pub const AXIS_LABEL: Color = Color::rgb(0x66, 0x66, 0x66);
    pub const PLACEHOLDER: Color = Color::rgb(0x55, 0x55, 0x55);
    pub const TEMPERATURE: Color = Color::rgb(0xff, 0x6b, 0x35);
    pub const SETPOINT: Color = Color::rgb(0xe7, 0x4c, 0x3c);
    pub const COLD: Color = Color::rgb(0x34, 0x98, 0xdb);
    pub const HOT: Color = Color::rgb(0xe7, 0x4c, 0x3c);
    pub const WARNING: Color = Color::rgb(0xf1, 0xc4, 0x0f);
    pub const STEEL: Color = Color::rgb(0x3a, 0x3a, 0x3a);
    pub const STEEL_LIGHT: Color = Color::rgb(0x5c, 0x5c, 0x5c);
    pub const TEXT: Color = Color::rgb(0xdd, 0xdd, 0xdd);
    pub const FIRE_LOW: Color = Color::rgb(0xb0, 0x1e, 0x0a);
    pub const FIRE_HIGH: Color = Color::rgb(0xff, 0xd2, 0x3f);
    pub const SMOKE: Color = Color::rgb(0x9a, 0x9a, 0x9a);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#ff6b35"), Color::rgb(0xff, 0x6b, 0x35));
        assert_eq!(Color::from_hex("2ecc71"), Color::rgb(0x2e, 0xcc, 0x71));
        assert_eq!(Color::from_hex("#fff"), Color::rgb(0x55, 0x55, 0x55));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
    }
}
