// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static SVG export of visible items.

use core::fmt::Write as _;

use kurbo::Size;

use crate::surface::Surface;
use crate::types::{Item, ItemFlags};

impl<M> Surface<M> {
    /// Serialize every visible, non-handle item into a standalone SVG document.
    ///
    /// Each layer becomes a `<g>` and each item a `<path>`, in paint order. `next_id` is called
    /// once per emitted element to name it, which lets callers keep ids unique across a larger
    /// document.
    pub fn to_svg(&self, size: Size, mut next_id: impl FnMut() -> String) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = size.width,
            h = size.height,
        );
        for &layer in self.layers() {
            let items: Vec<&Item<M>> = self
                .items_in(layer)
                .map(|(_, item)| item)
                .filter(|item| exported(item.flags))
                .collect();
            if items.is_empty() {
                continue;
            }
            let _ = write!(out, r#"<g id="{}">"#, escape(&next_id()));
            for item in items {
                write_item(&mut out, item, &next_id());
            }
            out.push_str("</g>");
        }
        out.push_str("</svg>");
        out
    }
}

fn exported(flags: ItemFlags) -> bool {
    flags.contains(ItemFlags::VISIBLE) && !flags.contains(ItemFlags::HANDLE)
}

fn write_item<M>(out: &mut String, item: &Item<M>, id: &str) {
    let paint = &item.paint;
    let fill = paint.fill.as_deref().unwrap_or("none");
    let _ = write!(
        out,
        r#"<path id="{}" d="{}" fill="{}""#,
        escape(id),
        item.shape.to_path().to_svg(),
        escape(fill),
    );
    let width = item.shape.intrinsic_stroke_width();
    match (&paint.stroke, width) {
        (Some(color), Some(w)) => {
            let _ = write!(out, r#" stroke="{}" stroke-width="{w}""#, escape(color));
        }
        (Some(color), None) => {
            let _ = write!(
                out,
                r#" stroke="{}" stroke-width="{}""#,
                escape(color),
                paint.stroke_width
            );
        }
        (None, _) => {}
    }
    out.push_str("/>");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemShape, Paint};
    use comical_hit::HandleDisc;
    use kurbo::{Point, Rect};

    #[test]
    fn exports_visible_items_without_handles() {
        let mut surface: Surface<()> = Surface::new();
        let body = surface.add_layer();
        let handles = surface.add_layer();
        surface.insert(
            body,
            Item::new(ItemShape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0)), ())
                .with_paint(Paint::stroke("black", 1.5)),
        );
        surface.insert(
            handles,
            Item::new(
                ItemShape::Handle(HandleDisc::new(Point::new(1.0, 1.0), 2.0)),
                (),
            )
            .with_flags(ItemFlags::default() | ItemFlags::HANDLE),
        );

        let mut n = 0;
        let svg = surface.to_svg(Size::new(20.0, 30.0), || {
            n += 1;
            format!("id-{n}")
        });
        assert!(svg.starts_with("<svg"), "{svg}");
        assert!(svg.contains(r#"viewBox="0 0 20 30""#), "{svg}");
        assert!(svg.contains(r#"stroke="black" stroke-width="1.5""#), "{svg}");
        assert_eq!(svg.matches("<path").count(), 1, "handles are not exported: {svg}");
        assert_eq!(svg.matches("<g ").count(), 1, "empty layers are skipped: {svg}");
        assert_eq!(n, 2, "one id for the group, one for the path");
    }

    #[test]
    fn escapes_attribute_text() {
        assert_eq!(escape(r#"a"<b>&"#), "a&quot;&lt;b&gt;&amp;");
    }
}
