use std::fmt::Write;

use jigsaw_core::{PiecePath, Point, Rect, Rgba, Shadow, Surface};

const PLACEHOLDER_COLOR: Rgba = [0x7f, 0x8c, 0x8d, 0xff];

/// Writes each draw call as SVG markup. Pieces show the image at `image_href`
/// when one is given, otherwise a flat placeholder fill.
pub(crate) struct SvgSurface {
    width: f32,
    height: f32,
    image_href: Option<String>,
    image_size: (f32, f32),
    body: String,
    next_id: usize,
    view_open: bool,
}

impl SvgSurface {
    pub(crate) fn new(
        width: f32,
        height: f32,
        image_href: Option<String>,
        image_size: (f32, f32),
    ) -> Self {
        Self {
            width,
            height,
            image_href,
            image_size,
            body: String::new(),
            next_id: 0,
            view_open: false,
        }
    }

    pub(crate) fn finish(mut self) -> String {
        self.close_view();
        format!(
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
                "width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            ),
            w = num(self.width),
            h = num(self.height),
            body = self.body,
        )
    }

    fn close_view(&mut self) {
        if self.view_open {
            self.body.push_str("</g>\n");
            self.view_open = false;
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn rect_element(&mut self, rect: Rect, color: Rgba, extra: &str) {
        let _ = writeln!(
            self.body,
            concat!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" ",
                "fill=\"{}\" fill-opacity=\"{}\"{}/>",
            ),
            num(rect.x),
            num(rect.y),
            num(rect.w),
            num(rect.h),
            hex(color),
            num(opacity(color, 1.0)),
            extra,
        );
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f32, height: f32, color: Rgba) {
        self.close_view();
        self.body.clear();
        self.width = width;
        self.height = height;
        self.rect_element(Rect::new(0.0, 0.0, width, height), color, "");
    }

    fn set_view(&mut self, offset: Point, zoom: f32) {
        self.close_view();
        let _ = writeln!(
            self.body,
            "<g transform=\"translate({} {}) scale({})\">",
            num(offset.0),
            num(offset.1),
            num(zoom)
        );
        self.view_open = true;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, shadow: Option<Shadow>) {
        if let Some(shadow) = shadow {
            let filter = self.fresh_id("blur");
            let _ = writeln!(
                self.body,
                concat!(
                    "<filter id=\"{}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">",
                    "<feGaussianBlur stdDeviation=\"{}\"/></filter>",
                ),
                filter,
                num(shadow.blur / 2.0)
            );
            let cast = Rect::new(
                rect.x + shadow.offset.0,
                rect.y + shadow.offset.1,
                rect.w,
                rect.h,
            );
            self.rect_element(cast, shadow.color, &format!(" filter=\"url(#{filter})\""));
        }
        self.rect_element(rect, color, "");
    }

    fn draw_image(&mut self, src: Rect, dst: Rect, alpha: f32, clip: Option<&PiecePath>) {
        let clip_attr = match clip {
            Some(path) => {
                let id = self.fresh_id("clip");
                let _ = writeln!(
                    self.body,
                    "<clipPath id=\"{id}\"><path d=\"{}\"/></clipPath>",
                    path.to_svg_path()
                );
                format!(" clip-path=\"url(#{id})\"")
            }
            None => String::new(),
        };
        let Some(href) = self.image_href.as_deref() else {
            let color = PLACEHOLDER_COLOR;
            let _ = writeln!(
                self.body,
                concat!(
                    "<g{} opacity=\"{}\">",
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/></g>",
                ),
                clip_attr,
                num(alpha),
                num(dst.x),
                num(dst.y),
                num(dst.w),
                num(dst.h),
                hex(color),
            );
            return;
        };
        let _ = writeln!(
            self.body,
            concat!(
                "<g{} opacity=\"{}\">",
                "<svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" ",
                "viewBox=\"{} {} {} {}\" preserveAspectRatio=\"none\">",
                "<image href=\"{}\" width=\"{}\" height=\"{}\"/></svg></g>",
            ),
            clip_attr,
            num(alpha),
            num(dst.x),
            num(dst.y),
            num(dst.w),
            num(dst.h),
            num(src.x),
            num(src.y),
            num(src.w),
            num(src.h),
            escape_attr(href),
            num(self.image_size.0),
            num(self.image_size.1),
        );
    }

    fn stroke_path(&mut self, path: &PiecePath, color: Rgba, width: f32, alpha: f32) {
        let _ = writeln!(
            self.body,
            concat!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" ",
                "stroke-opacity=\"{}\" stroke-linejoin=\"round\"/>",
            ),
            path.to_svg_path(),
            hex(color),
            num(width),
            num(opacity(color, alpha)),
        );
    }
}

fn num(value: f32) -> String {
    let text = format!("{value:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn hex(color: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

fn opacity(color: Rgba, alpha: f32) -> f32 {
    (color[3] as f32 / 255.0 * alpha).clamp(0.0, 1.0)
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jigsaw_core::{render, PuzzleImage, PuzzleSession, Rules};

    fn session() -> PuzzleSession {
        PuzzleSession::with_seed(
            PuzzleImage::new(400, 300).with_source("cat & dog.png"),
            12,
            (800.0, 600.0),
            Rules::default(),
            3,
        )
        .expect("session")
    }

    fn draw(session: &PuzzleSession, href: Option<String>) -> String {
        let (canvas_w, canvas_h) = session.canvas_size();
        let mut surface = SvgSurface::new(canvas_w, canvas_h, href, session.image().size());
        render(session, None, &mut surface);
        surface.finish()
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(1.23456), "1.235");
    }

    #[test]
    fn colors_and_text_are_escaped() {
        assert_eq!(hex([0x2c, 0x3e, 0x50, 0xff]), "#2c3e50");
        assert_eq!(opacity([0, 0, 0, 0xff], 0.2), 0.2);
        assert_eq!(escape_attr("a\"b<c>&'"), "a&quot;b&lt;c&gt;&amp;&apos;");
    }

    #[test]
    fn every_piece_gets_a_clip_and_an_outline() {
        let session = session();
        let svg = draw(&session, session.image().source.clone());
        let pieces = session.pieces().len();
        assert_eq!(svg.matches("<clipPath").count(), pieces);
        assert_eq!(svg.matches("stroke=\"#000000\"").count(), pieces);
        let opened = svg.matches("<g ").count() + svg.matches("<g>").count();
        assert_eq!(opened, svg.matches("</g>").count());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("href=\"cat &amp; dog.png\""));
        assert!(svg.contains("fill=\"#2c3e50\""));
        assert!(svg.contains("<feGaussianBlur"));
    }

    #[test]
    fn missing_image_draws_placeholders() {
        let mut session = session();
        session.toggle_guide();
        let svg = draw(&session, None);
        assert!(!svg.contains("<image"));
        // One placeholder per piece plus the guide.
        assert_eq!(
            svg.matches(&format!("fill=\"{}\"", hex(PLACEHOLDER_COLOR))).count(),
            session.pieces().len() + 1
        );
    }

    #[test]
    fn clear_starts_a_fresh_document() {
        let session = session();
        let mut surface = SvgSurface::new(10.0, 10.0, None, (1.0, 1.0));
        render(&session, None, &mut surface);
        render(&session, None, &mut surface);
        let svg = surface.finish();
        assert_eq!(svg.matches("<g transform").count(), 1);
        assert!(svg.contains("width=\"800\""));
    }
}
