// Drawing surface port - renderers draw through this, adapters rasterize or record
use crate::domain::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
}

/// A polyline made of one or more sub-paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.segments.push(PathSegment::LineTo(p));
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[cfg(test)]
    pub fn subpath_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::MoveTo(_)))
            .count()
    }

    /// Pairs of consecutive points joined by a `LineTo`.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let mut cursor: Option<Point> = None;
        self.segments.iter().filter_map(move |segment| match *segment {
            PathSegment::MoveTo(p) => {
                cursor = Some(p);
                None
            }
            PathSegment::LineTo(p) => {
                let from = cursor.replace(p)?;
                Some((from, p))
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// `(on, off)` dash lengths in pixels.
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
    pub align: TextAlign,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(color: Color, size: f32, align: TextAlign) -> Self {
        Self {
            color,
            size,
            align,
            bold: false,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }
}

/// Approximate advance width for the sans-serif faces the dashboard uses.
pub fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.58
}

pub trait DrawSurface {
    /// Logical size in pixels.
    fn size(&self) -> (f32, f32);

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// `at.y` is the text baseline.
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        estimate_text_width(text, size)
    }

    fn is_drawable(&self) -> bool {
        let (w, h) = self.size();
        w >= 1.0 && h >= 1.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_lines_skip_across_subpaths() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(1.0, 0.0));
        path.move_to(Point::new(5.0, 0.0));
        path.line_to(Point::new(6.0, 0.0));

        let lines: Vec<_> = path.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(path.subpath_count(), 2);
        assert!(lines.iter().all(|(a, b)| !(a.x == 1.0 && b.x == 5.0)));
    }
}
