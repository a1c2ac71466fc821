//! Rendering, cache bounds and hit testing.
//!
//! A node that needs isolation (opacity, filters, shadow, shaders, a non-default composite
//! operation, or an explicit `cache` flag) is drawn together with its subtree into an offscreen
//! layer sized to its world-space cache box, then composited back with its effects applied once.

use crate::foundation::core::{Affine, BBox, Point, Rect};
use crate::foundation::error::VignetteResult;
use crate::render::context::Context2d;
use crate::render::effects::{CompositeOp, Shadow, blur_radius, serialize_filters};
use crate::scene::element::Element;
use crate::scene::node::Node;
use crate::transform::affine::{transform_scalar, transform_vector};

/// Extra pixels around the world-space cache box.
const CACHE_MARGIN: f64 = 2.0;

impl Node {
    pub fn has_filters(&self) -> bool {
        self.0.computed.has_filters.get()
    }

    pub fn has_shadow(&self) -> bool {
        self.0.computed.has_shadow.get()
    }

    /// CSS filter string with blur radii scaled into composite space.
    pub fn filter_string(&self) -> Option<String> {
        self.0.computed.filter_string.get()
    }

    pub fn requires_cache(&self) -> bool {
        self.0.computed.requires_cache.get()
    }

    /// Local-space bounds of the content and every child's full cache box, plus `cache_padding`.
    pub fn cache_bbox(&self) -> Rect {
        self.0.computed.cache_bbox.get()
    }

    /// [`Node::cache_bbox`] grown by blur and shadow, which are applied after caching.
    pub fn full_cache_bbox(&self) -> Rect {
        self.0.computed.full_cache_bbox.get()
    }

    /// Cache box in world space, snapped to pixels and clipped to the view canvas.
    pub fn world_space_cache_bbox(&self) -> Rect {
        self.0.computed.world_space_cache_bbox.get()
    }

    /// Children ordered by `z_index`; ties keep their list order.
    pub fn sorted_children(&self) -> Vec<Node> {
        self.0.computed.sorted_children.get()
    }

    /// Local-space bounds of what the element itself draws.
    pub fn content_bbox(&self) -> Rect {
        self.element()
            .drawable()
            .map_or(Rect::ZERO, |drawable| drawable.content_bbox(self))
    }

    pub(crate) fn compute_has_filters(&self) -> bool {
        self.filters().get().iter().any(|f| f.is_active())
    }

    pub(crate) fn compute_has_shadow(&self) -> bool {
        self.shadow().is_active()
    }

    pub(crate) fn compute_filter_string(&self) -> Option<String> {
        serialize_filters(&self.filters().get(), self.composite_to_world())
    }

    pub(crate) fn compute_requires_cache(&self) -> bool {
        self.cache().get()
            || self.opacity().get() < 1.0
            || self.composite_operation().get() != CompositeOp::SourceOver
            || self.has_filters()
            || self.has_shadow()
            || !self.shaders().get().is_empty()
    }

    pub(crate) fn compute_cache_bbox(&self) -> Rect {
        let content = self.content_bbox();
        let padding = self.cache_padding().get();
        let children = self.children();
        if children.is_empty() {
            return content.add_spacing(padding);
        }
        let mut points: Vec<Point> = content.corners().to_vec();
        for child in &children {
            points.extend(
                child
                    .full_cache_bbox()
                    .transform_corners(child.local_to_parent()),
            );
        }
        Rect::bounding(points).add_spacing(padding)
    }

    pub(crate) fn compute_full_cache_bbox(&self) -> Rect {
        let matrix = self.composite_to_local();
        let offset = transform_vector(matrix, self.shadow_offset().get());
        let blur = transform_scalar(self.shadow_blur().get(), matrix);
        let mut rect = self
            .cache_bbox()
            .expand_by(blur_radius(&self.filters().get()) * 2.0 + blur);
        if offset.x < 0.0 {
            rect.x0 += offset.x;
        } else {
            rect.x1 += offset.x;
        }
        if offset.y < 0.0 {
            rect.y0 += offset.y;
        } else {
            rect.y1 += offset.y;
        }
        rect
    }

    pub(crate) fn compute_world_space_cache_bbox(&self) -> Rect {
        let cache = Rect::bounding(self.cache_bbox().transform_corners(self.local_to_world()))
            .pixel_perfect()
            .expand_by(CACHE_MARGIN);
        let Some(view) = self.view() else {
            return cache;
        };
        let Element::View(data) = view.element() else {
            return cache;
        };
        let canvas = Rect::from_size_centered(data.size.get())
            .add_spacing(view.cache_padding().get())
            .transform_corners(view.local_to_world());
        Rect::bounding(canvas).intersection(&cache)
    }

    fn shadow(&self) -> Shadow {
        Shadow {
            color: self.shadow_color().get(),
            blur: self.shadow_blur().get(),
            offset: self.shadow_offset().get(),
        }
    }

    /// Render this node and its subtree. Nothing is drawn when the absolute opacity is zero.
    ///
    /// Fails only when an offscreen cache layer cannot be allocated.
    #[tracing::instrument(skip_all, fields(key = %self.key()))]
    pub fn render(&self, ctx: &mut dyn Context2d) -> VignetteResult<()> {
        if self.absolute_opacity() <= 0.0 {
            return Ok(());
        }
        ctx.save();
        ctx.transform(self.local_to_parent());
        let result = if self.requires_cache() {
            let rect = self.world_space_cache_bbox();
            if rect.is_degenerate() {
                Ok(())
            } else {
                self.render_cached(ctx, rect)
            }
        } else {
            self.draw(ctx)
        };
        ctx.restore();
        result
    }

    fn render_cached(&self, ctx: &mut dyn Context2d, rect: Rect) -> VignetteResult<()> {
        let width = rect.width().round().max(1.0) as u32;
        let height = rect.height().round().max(1.0) as u32;
        let mut layer = ctx.create_layer(width, height)?;
        layer.set_transform(Affine::translate((-rect.x0, -rect.y0)) * self.local_to_world());
        self.draw(layer.as_mut())?;
        let layer = layer.finish_layer();

        self.setup_draw_from_cache(ctx);
        let origin = Point::new(rect.x0, rect.y0);
        let shaders = self.shaders().get();
        ctx.draw_layer(&layer, origin, &shaders);

        let overlay = self.composite_override().get();
        if overlay > 0.0 {
            ctx.save();
            ctx.set_global_alpha(ctx.global_alpha() * overlay);
            ctx.set_composite_op(CompositeOp::SourceOver);
            ctx.draw_layer(&layer, origin, &shaders);
            ctx.restore();
        }
        Ok(())
    }

    /// Apply the effects of this node to `ctx` and switch it to world space.
    fn setup_draw_from_cache(&self, ctx: &mut dyn Context2d) {
        ctx.set_composite_op(self.composite_operation().get());
        ctx.set_global_alpha(ctx.global_alpha() * self.opacity().get());
        if self.has_filters() {
            ctx.set_filter(self.filter_string().as_deref());
        }
        if self.has_shadow() {
            let matrix = self.composite_to_world();
            ctx.set_shadow(&Shadow {
                color: self.shadow_color().get(),
                blur: transform_scalar(self.shadow_blur().get(), matrix),
                offset: transform_vector(matrix, self.shadow_offset().get()),
            });
        }
        ctx.transform(self.world_to_local());
    }

    /// Draw the element and then the children, in local space.
    pub(crate) fn draw(&self, ctx: &mut dyn Context2d) -> VignetteResult<()> {
        if let Some(drawable) = self.element().drawable() {
            drawable.draw_content(self, ctx)?;
        }
        for child in self.sorted_children() {
            child.render(ctx)?;
        }
        Ok(())
    }

    /// Topmost node of this subtree under `position`, given in the parent's space.
    pub fn hit(&self, position: Point) -> Option<Node> {
        let local = self.local_to_parent().inverse() * position;
        for child in self.children().iter().rev() {
            if let Some(hit) = child.hit(local) {
                return Some(hit);
            }
        }
        let drawable = self.element().drawable()?;
        drawable.contains(self, local).then(|| self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/cache.rs"]
mod tests;
