//! SVG markup to flat lists of shape descriptors.
//!
//! Groups and `use` references are flattened: every supported leaf element becomes one
//! [`SvgShapeData`] carrying its accumulated transform and inherited paint. The root transform
//! maps the view box onto the document size, centered at the origin.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use crate::foundation::color::Color;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::error::{VignetteError, VignetteResult};
use crate::transform::affine::{Decomposed, decompose};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// `use` chains deeper than this are treated as cycles.
const MAX_USE_DEPTH: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SvgPaint {
    Color(Color),
    /// Follows the fill or stroke of the SVG node itself.
    CurrentColor,
}

/// Paint inherited down the element tree. `None` leaves the shape's default in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SvgStyle {
    pub fill: Option<SvgPaint>,
    pub stroke: Option<SvgPaint>,
    pub line_width: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SvgShapeKind {
    Path { data: BezPath },
    /// `radius` holds the `rx` and `ry` attributes, zero when absent.
    Rect { size: Vec2, radius: Vec2 },
    /// Circles and ellipses.
    Circle { size: Vec2 },
    /// Lines, polylines and polygons (closed by repeating the first point).
    Line { points: Vec<Point> },
    Img { src: String, size: Vec2 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SvgShapeData {
    pub id: String,
    pub kind: SvgShapeKind,
    pub transform: Decomposed,
    pub style: SvgStyle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgDocumentData {
    pub size: Vec2,
    pub nodes: Vec<SvgShapeData>,
}

/// Parsed documents keyed by their source text.
#[derive(Debug, Default)]
pub struct SvgPool {
    documents: RefCell<HashMap<String, Rc<SvgDocumentData>>>,
}

impl SvgPool {
    /// Cached document for `svg`, parsing it on first use. Documents without a size are
    /// re-parsed every time.
    pub fn get_or_parse(&self, svg: &str) -> VignetteResult<Rc<SvgDocumentData>> {
        if let Some(document) = self.documents.borrow().get(svg)
            && (document.size.x > 0.0 || document.size.y > 0.0)
        {
            return Ok(document.clone());
        }
        let document = Rc::new(parse_svg_data(svg)?);
        self.documents
            .borrow_mut()
            .insert(svg.to_owned(), document.clone());
        Ok(document)
    }

    pub fn len(&self) -> usize {
        self.documents.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.documents.borrow_mut().clear();
    }
}

#[tracing::instrument(skip_all, fields(len = svg.len()))]
pub fn parse_svg_data(svg: &str) -> VignetteResult<SvgDocumentData> {
    let document = roxmltree::Document::parse(svg)
        .map_err(|e| VignetteError::parse(format!("invalid SVG markup: {e}")))?;
    let root = document
        .descendants()
        .find(|n| n.has_tag_name("svg"))
        .ok_or_else(|| VignetteError::parse("no <svg> element found"))?;

    let view_box = root
        .attribute("viewBox")
        .and_then(|v| svgtypes::ViewBox::from_str(v).ok())
        .map(|vb| Rect::new(vb.x, vb.y, vb.x + vb.w, vb.y + vb.h));
    let width = length_attribute(root, "width");
    let height = length_attribute(root, "height");

    let (view_box, size) = match (view_box, width.is_some() || height.is_some()) {
        (Some(view_box), false) => (view_box, Vec2::new(view_box.width(), view_box.height())),
        (view_box, true) => {
            let fallback = view_box.unwrap_or(Rect::ZERO);
            let size = Vec2::new(
                width.unwrap_or(fallback.width()),
                height.unwrap_or(fallback.height()),
            );
            (view_box.unwrap_or(Rect::new(0.0, 0.0, size.x, size.y)), size)
        }
        (None, false) => {
            let bounds = fallback_bounds(svg);
            (bounds, Vec2::new(bounds.width(), bounds.height()))
        }
    };

    let scale = Vec2::new(ratio(size.x, view_box.width()), ratio(size.y, view_box.height()));
    let center = view_box.center();
    let transform =
        Affine::scale_non_uniform(scale.x, scale.y) * Affine::translate((-center.x, -center.y));

    let mut nodes = Vec::new();
    let extractor = Extractor { document: &document };
    extractor.group(root, transform, SvgStyle::default(), 0, &mut nodes);
    Ok(SvgDocumentData { size, nodes })
}

fn ratio(a: f64, b: f64) -> f64 {
    if b.abs() > f64::EPSILON { a / b } else { 1.0 }
}

/// Bounds of the rendered content, for documents with neither a view box nor a size.
fn fallback_bounds(svg: &str) -> Rect {
    match usvg::Tree::from_str(svg, &usvg::Options::default()) {
        Ok(tree) => {
            let b = tree.root().abs_bounding_box();
            Rect::new(
                f64::from(b.left()),
                f64::from(b.top()),
                f64::from(b.right()),
                f64::from(b.bottom()),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not measure SVG without viewBox or size");
            Rect::ZERO
        }
    }
}

fn length_attribute(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name)
        .and_then(|v| svgtypes::Length::from_str(v).ok())
        .map(|length| length.number)
}

fn number_attribute(node: roxmltree::Node<'_, '_>, name: &str) -> f64 {
    length_attribute(node, name).unwrap_or(0.0)
}

fn paint_attribute(node: roxmltree::Node<'_, '_>, name: &str) -> Option<SvgPaint> {
    let value = node.attribute(name)?.trim();
    if value == "transparent" {
        return Some(SvgPaint::Color(Color::TRANSPARENT));
    }
    match svgtypes::Paint::from_str(value) {
        Ok(svgtypes::Paint::None) => Some(SvgPaint::Color(Color::TRANSPARENT)),
        Ok(svgtypes::Paint::CurrentColor) => Some(SvgPaint::CurrentColor),
        Ok(svgtypes::Paint::Color(c)) => Some(SvgPaint::Color(Color::from_rgba8(
            c.red, c.green, c.blue, c.alpha,
        ))),
        Ok(_) | Err(_) => None,
    }
}

struct Extractor<'a, 'input> {
    document: &'a roxmltree::Document<'input>,
}

impl<'a, 'input> Extractor<'a, 'input> {
    fn group(
        &self,
        parent: roxmltree::Node<'a, 'input>,
        transform: Affine,
        style: SvgStyle,
        depth: usize,
        out: &mut Vec<SvgShapeData>,
    ) {
        for child in parent.children().filter(roxmltree::Node::is_element) {
            self.element(child, transform, style, depth, out);
        }
    }

    fn element_transform(node: roxmltree::Node<'_, '_>, parent: Affine) -> Affine {
        let own = node
            .attribute("transform")
            .and_then(|v| svgtypes::Transform::from_str(v).ok())
            .map_or(Affine::IDENTITY, |t| Affine::new([t.a, t.b, t.c, t.d, t.e, t.f]));
        parent
            * own
            * Affine::translate((number_attribute(node, "x"), number_attribute(node, "y")))
    }

    fn element_style(node: roxmltree::Node<'_, '_>, inherited: SvgStyle) -> SvgStyle {
        SvgStyle {
            fill: paint_attribute(node, "fill").or(inherited.fill),
            stroke: paint_attribute(node, "stroke").or(inherited.stroke),
            line_width: length_attribute(node, "stroke-width").or(inherited.line_width),
        }
    }

    fn element(
        &self,
        node: roxmltree::Node<'a, 'input>,
        parent: Affine,
        inherited: SvgStyle,
        depth: usize,
        out: &mut Vec<SvgShapeData>,
    ) {
        let transform = Self::element_transform(node, parent);
        let style = Self::element_style(node, inherited);
        let tag = node.tag_name().name();
        let id = |fallback: &str| {
            node.attribute("id")
                .filter(|id| !id.is_empty())
                .unwrap_or(fallback)
                .to_owned()
        };
        let shape = |id: String, kind: SvgShapeKind, matrix: Affine| SvgShapeData {
            id,
            kind,
            transform: decompose(matrix),
            style,
        };

        match tag {
            "g" => self.group(node, transform, style, depth, out),
            "use" => {
                if depth >= MAX_USE_DEPTH {
                    tracing::warn!(element = %id("use"), "SVG use chain too deep, skipping");
                    return;
                }
                let href = node
                    .attribute((XLINK_NS, "href"))
                    .or_else(|| node.attribute("href"))
                    .unwrap_or_default();
                let target = href.strip_prefix('#').and_then(|target| {
                    self.document
                        .descendants()
                        .find(|n| n.is_element() && n.attribute("id") == Some(target))
                });
                if let Some(target) = target {
                    self.element(target, transform, inherited, depth + 1, out);
                }
            }
            "path" => {
                let data = node.attribute("d").unwrap_or_default();
                if data.trim().is_empty() {
                    tracing::warn!(element = %id(""), "blank path data");
                    return;
                }
                match BezPath::from_svg(data) {
                    Ok(data) => out.push(shape(id("path"), SvgShapeKind::Path { data }, transform)),
                    Err(e) => tracing::warn!(element = %id(""), error = %e, "invalid path data"),
                }
            }
            "rect" => {
                let width = number_attribute(node, "width");
                let height = number_attribute(node, "height");
                let radius = Vec2::new(number_attribute(node, "rx"), number_attribute(node, "ry"));
                out.push(shape(
                    id("rect"),
                    SvgShapeKind::Rect {
                        size: Vec2::new(width, height),
                        radius,
                    },
                    transform * Affine::translate((width / 2.0, height / 2.0)),
                ));
            }
            "circle" | "ellipse" => {
                let size = if tag == "circle" {
                    let d = number_attribute(node, "r") * 2.0;
                    Vec2::new(d, d)
                } else {
                    Vec2::new(
                        number_attribute(node, "rx") * 2.0,
                        number_attribute(node, "ry") * 2.0,
                    )
                };
                let center = (number_attribute(node, "cx"), number_attribute(node, "cy"));
                out.push(shape(
                    id(tag),
                    SvgShapeKind::Circle { size },
                    transform * Affine::translate(center),
                ));
            }
            "line" | "polyline" | "polygon" => {
                let mut points: Vec<Point> = if tag == "line" {
                    vec![
                        Point::new(number_attribute(node, "x1"), number_attribute(node, "y1")),
                        Point::new(number_attribute(node, "x2"), number_attribute(node, "y2")),
                    ]
                } else {
                    svgtypes::PointsParser::from(node.attribute("points").unwrap_or_default())
                        .map(|(x, y)| Point::new(x, y))
                        .collect()
                };
                if tag == "polygon"
                    && let Some(first) = points.first().copied()
                {
                    points.push(first);
                }
                out.push(shape(id(tag), SvgShapeKind::Line { points }, transform));
            }
            "image" => {
                let size = Vec2::new(number_attribute(node, "width"), number_attribute(node, "height"));
                let src = node
                    .attribute("href")
                    .or_else(|| node.attribute((XLINK_NS, "href")))
                    .unwrap_or_default()
                    .to_owned();
                out.push(shape(
                    id(tag),
                    SvgShapeKind::Img { src, size },
                    transform * Affine::translate((size.x / 2.0, size.y / 2.0)),
                ));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/svg/parse.rs"]
mod tests;
