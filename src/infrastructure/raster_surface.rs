// Raster surface - tiny-skia pixmap with embedded-graphics mono text, encoded as PNG
use crate::application::surface::{DrawSurface, Path, Point, Rect, Stroke, TextAlign, TextStyle};
use crate::domain::color::Color;
use bytes::Bytes;
use embedded_graphics::mono_font::{iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, RgbColor, Size};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::Drawable;
use std::borrow::Cow;
use std::convert::Infallible;
use tiny_skia as sk;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("surface has no pixels")]
    Empty,
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Pick the Latin-1 mono font closest to the requested pixel size.
fn mono_font(size: f32, bold: bool) -> &'static MonoFont<'static> {
    use iso_8859_1::*;
    match (size, bold) {
        (s, _) if s < 8.0 => &FONT_5X7,
        (s, _) if s < 10.5 => &FONT_6X10,
        (s, false) if s < 12.5 => &FONT_6X12,
        (s, true) if s < 12.5 => &FONT_6X13_BOLD,
        (s, false) if s < 14.5 => &FONT_7X13,
        (s, true) if s < 14.5 => &FONT_7X13_BOLD,
        (s, false) if s < 17.0 => &FONT_9X15,
        (s, true) if s < 17.0 => &FONT_9X15_BOLD,
        (_, false) => &FONT_10X20,
        (_, true) => &FONT_9X18_BOLD,
    }
}

/// The mono fonts cover Latin-1; spell out the few typographic marks we use.
fn latin1(text: &str) -> Cow<'_, str> {
    if text.contains('\u{2026}') {
        Cow::Owned(text.replace('\u{2026}', "..."))
    } else {
        Cow::Borrowed(text)
    }
}

fn paint(color: Color) -> sk::Paint<'static> {
    let mut paint = sk::Paint::default();
    paint.set_color_rgba8(
        color.r,
        color.g,
        color.b,
        (color.a.clamp(0.0, 1.0) * 255.0).round() as u8,
    );
    paint.anti_alias = true;
    paint
}

/// Lets embedded-graphics text draw straight onto the pixmap.
struct PixmapTarget<'a> {
    pixmap: &'a mut sk::Pixmap,
    alpha: f32,
}

impl OriginDimensions for PixmapTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.pixmap.width(), self.pixmap.height())
    }
}

impl DrawTarget for PixmapTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(at, color) in pixels {
            let Some(rect) = sk::Rect::from_xywh(at.x as f32, at.y as f32, 1.0, 1.0) else {
                continue;
            };
            let mut paint = paint(Color::rgb(color.r(), color.g(), color.b()).with_alpha(self.alpha));
            paint.anti_alias = false;
            self.pixmap
                .fill_rect(rect, &paint, sk::Transform::identity(), None);
        }
        Ok(())
    }
}

pub struct RasterSurface {
    /// `None` for a zero-sized surface, which tiny-skia cannot allocate.
    pixmap: Option<sk::Pixmap>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: sk::Pixmap::new(width, height),
        }
    }

    pub fn encode_png(&self) -> Result<Bytes, RasterError> {
        let pixmap = self.pixmap.as_ref().ok_or(RasterError::Empty)?;
        let png = pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        Ok(Bytes::from(png))
    }

    fn stroke_sk_path(&mut self, path: sk::Path, stroke: &Stroke) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let mut sk_stroke = sk::Stroke {
            width: stroke.width.max(0.1),
            line_cap: sk::LineCap::Butt,
            line_join: sk::LineJoin::Round,
            ..sk::Stroke::default()
        };
        if let Some((on, off)) = stroke.dash {
            sk_stroke.dash = sk::StrokeDash::new(vec![on, off], 0.0);
        }
        pixmap.stroke_path(
            &path,
            &paint(stroke.color),
            &sk_stroke,
            sk::Transform::identity(),
            None,
        );
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> (f32, f32) {
        self.pixmap
            .as_ref()
            .map_or((0.0, 0.0), |p| (p.width() as f32, p.height() as f32))
    }

    fn clear(&mut self, color: Color) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(sk::Color::from_rgba8(color.r, color.g, color.b, 0xff));
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(rect) = sk::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        pixmap.fill_rect(rect, &paint(color), sk::Transform::identity(), None);
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        let mut pb = sk::PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        if let Some(path) = pb.finish() {
            self.stroke_sk_path(path, stroke);
        }
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        let mut pb = sk::PathBuilder::new();
        let mut pen: Option<Point> = None;
        for (from, to) in path.lines() {
            if pen != Some(from) {
                pb.move_to(from.x, from.y);
            }
            pb.line_to(to.x, to.y);
            pen = Some(to);
        }
        if let Some(path) = pb.finish() {
            self.stroke_sk_path(path, stroke);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(circle) = sk::PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        pixmap.fill_path(
            &circle,
            &paint(color),
            sk::FillRule::Winding,
            sk::Transform::identity(),
            None,
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let character_style = MonoTextStyle::new(
            mono_font(style.size, style.bold),
            Rgb888::new(style.color.r, style.color.g, style.color.b),
        );
        let text_style = TextStyleBuilder::new()
            .baseline(Baseline::Alphabetic)
            .alignment(match style.align {
                TextAlign::Left => Alignment::Left,
                TextAlign::Center => Alignment::Center,
                TextAlign::Right => Alignment::Right,
            })
            .build();
        let position =
            embedded_graphics::prelude::Point::new(at.x.round() as i32, at.y.round() as i32);
        let mut target = PixmapTarget {
            pixmap,
            alpha: style.color.a,
        };
        let text = latin1(text);
        let Ok(_) = Text::with_text_style(&text, position, character_style, text_style)
            .draw(&mut target);
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        let style = MonoTextStyle::new(mono_font(size, false), Rgb888::WHITE);
        let metrics = style.measure_string(
            &latin1(text),
            embedded_graphics::prelude::Point::zero(),
            Baseline::Alphabetic,
        );
        metrics.next_position.x as f32
    }
}
