use glam::Vec3;

/// Linear RGB colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const RED: Self = Self([1.0, 0.0, 0.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0]);
    pub const CYAN: Self = Self([0.0, 1.0, 1.0]);
    pub const MAGENTA: Self = Self([1.0, 0.0, 1.0]);
    pub const YELLOW: Self = Self([1.0, 1.0, 0.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);

    /// Resolve a palette character. `0` is black, `1` is white and anything
    /// unknown falls back to black.
    pub fn from_char(c: char) -> Self {
        match c {
            'r' => Self::RED,
            'g' => Self::GREEN,
            'b' => Self::BLUE,
            'c' => Self::CYAN,
            'm' => Self::MAGENTA,
            'y' => Self::YELLOW,
            '1' => Self::WHITE,
            _ => Self::BLACK,
        }
    }
}

impl From<Rgb> for Vec3 {
    fn from(c: Rgb) -> Self {
        Vec3::from_array(c.0)
    }
}

/// Steps through a palette string, restarting at the first colour after the last.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<Rgb>,
    index: usize,
}

impl ColorCycle {
    pub fn new(palette: &str) -> Self {
        Self {
            palette: palette.chars().map(Rgb::from_char).collect(),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.palette.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }
}

impl Iterator for ColorCycle {
    type Item = Rgb;

    fn next(&mut self) -> Option<Rgb> {
        // An empty palette yields black forever, like an unknown character.
        let Some(&color) = self.palette.get(self.index) else {
            return Some(Rgb::BLACK);
        };
        self.index = (self.index + 1) % self.palette.len();
        Some(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_characters() {
        assert_eq!(Rgb::from_char('r'), Rgb::RED);
        assert_eq!(Rgb::from_char('c'), Rgb::CYAN);
        assert_eq!(Rgb::from_char('0'), Rgb::BLACK);
        assert_eq!(Rgb::from_char('1'), Rgb::WHITE);
        assert_eq!(Rgb::from_char('?'), Rgb::BLACK);
    }

    #[test]
    fn cycle_wraps_to_start() {
        let colors: Vec<Rgb> = ColorCycle::new("rgb").take(5).collect();
        assert_eq!(
            colors,
            vec![Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::RED, Rgb::GREEN]
        );
    }

    #[test]
    fn empty_cycle_is_black() {
        let mut c = ColorCycle::new("");
        assert!(c.is_empty());
        assert_eq!(c.next(), Some(Rgb::BLACK));
    }
}
