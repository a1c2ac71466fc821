//! The scene: node registry, view root and shared asset pools.
//!
//! Nodes never manage key uniqueness themselves. Each node registers with its scene on
//! construction and receives its final key together with an [`Unregister`] callback that
//! [`Node::dispose`] invokes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::assets::image_pool::ImagePool;
use crate::foundation::core::{Fps, Spacing, Vec2};
use crate::foundation::error::VignetteResult;
use crate::render::context::Context2d;
use crate::scene::element::{Element, NodeKind};
use crate::scene::node::{Node, WeakNode};
use crate::signal::signal::SignalValue;
use crate::svg::parse::SvgPool;

pub type Unregister = Box<dyn FnOnce()>;

/// Key of the view node; generated keys are prefixed with it.
pub const VIEW_KEY: &str = "view";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Canvas size in pixels.
    pub size: Vec2,
    /// Extra room around the canvas when clipping cache layers.
    pub cache_padding: Spacing,
    pub fps: Fps,
    /// Directory local image sources are resolved against.
    pub asset_root: PathBuf,
    pub asset_hash: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(1920.0, 1080.0),
            cache_padding: Spacing::ZERO,
            fps: Fps::default(),
            asset_root: PathBuf::from("."),
            asset_hash: String::new(),
        }
    }
}

pub(crate) struct SceneInner {
    config: SceneConfig,
    nodes: RefCell<HashMap<String, WeakNode>>,
    counters: RefCell<HashMap<&'static str, usize>>,
    view: Node,
    images: ImagePool,
    svgs: SvgPool,
}

/// Handle to a scene. Cloning shares the same scene.
#[derive(Clone)]
pub struct Scene(Rc<SceneInner>);

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("size", &self.0.config.size)
            .field("nodes", &self.0.nodes.borrow().len())
            .finish()
    }
}

fn unregister(scene: Weak<SceneInner>, key: String) -> Unregister {
    Box::new(move || {
        if let Some(scene) = scene.upgrade() {
            scene.nodes.borrow_mut().remove(&key);
        }
    })
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let images = ImagePool::new(config.asset_root.clone(), config.asset_hash.clone());
        Self::with_image_pool(config, images)
    }

    /// Scene using a caller-provided image pool, typically one with a custom loader.
    pub fn with_image_pool(config: SceneConfig, images: ImagePool) -> Self {
        let inner = Rc::new_cyclic(|scene: &Weak<SceneInner>| {
            let mut nodes = HashMap::new();
            let view = Node::register(
                scene.clone(),
                Element::view(config.size, config.asset_hash.clone()),
                |node| {
                    nodes.insert(VIEW_KEY.to_owned(), node);
                    (VIEW_KEY.to_owned(), unregister(scene.clone(), VIEW_KEY.to_owned()))
                },
            );
            view.cache_padding().set(config.cache_padding);
            if let Element::View(data) = view.element() {
                let size = data.size.clone();
                view.position()
                    .set(SignalValue::reactive(move || size.get() / 2.0));
            }
            SceneInner {
                config,
                nodes: RefCell::new(nodes),
                counters: RefCell::new(HashMap::new()),
                view,
                images,
                svgs: SvgPool::default(),
            }
        });
        tracing::debug!(size = ?inner.config.size, "scene created");
        Self(inner)
    }

    pub(crate) fn from_inner(inner: Rc<SceneInner>) -> Self {
        Self(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<SceneInner> {
        Rc::downgrade(&self.0)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.0.config
    }

    /// Register `node`, returning its final key and the callback that releases it.
    ///
    /// A requested key that is already taken is logged and replaced by a generated one.
    pub(crate) fn register_node(
        &self,
        node: WeakNode,
        kind: NodeKind,
        key: Option<&str>,
    ) -> (String, Unregister) {
        let key = match key {
            Some(key) if self.is_taken(key) => {
                let generated = self.generate_key(kind);
                tracing::error!(
                    inspect = %generated,
                    requested = %key,
                    remarks = "Node keys must be unique within a scene; a generated key is used instead.",
                    "Duplicated node key"
                );
                generated
            }
            Some(key) => key.to_owned(),
            None => self.generate_key(kind),
        };
        self.0.nodes.borrow_mut().insert(key.clone(), node);

        let release = unregister(self.downgrade(), key.clone());
        (key, release)
    }

    fn is_taken(&self, key: &str) -> bool {
        self.0
            .nodes
            .borrow()
            .get(key)
            .is_some_and(|node| node.upgrade().is_some())
    }

    fn generate_key(&self, kind: NodeKind) -> String {
        let class = kind.class_name();
        loop {
            let index = {
                let mut counters = self.0.counters.borrow_mut();
                let counter = counters.entry(class).or_insert(0);
                let index = *counter;
                *counter += 1;
                index
            };
            let key = format!("{VIEW_KEY}/{class}[{index}]");
            if !self.is_taken(&key) {
                return key;
            }
        }
    }

    /// Root of the scene graph; everything rendered is a descendant of it.
    pub fn get_view(&self) -> Node {
        self.0.view.clone()
    }

    pub fn get_node(&self, key: &str) -> Option<Node> {
        self.0.nodes.borrow().get(key).and_then(WeakNode::upgrade)
    }

    /// Number of live registered nodes, the view included.
    pub fn node_count(&self) -> usize {
        self.0
            .nodes
            .borrow()
            .values()
            .filter(|node| node.upgrade().is_some())
            .count()
    }

    pub fn image_pool(&self) -> &ImagePool {
        &self.0.images
    }

    pub fn svg_pool(&self) -> &SvgPool {
        &self.0.svgs
    }

    pub fn asset_hash(&self) -> String {
        self.0.images.asset_hash()
    }

    /// Change the asset hash, evicting every cached local image.
    pub fn set_asset_hash(&self, hash: impl Into<String>) {
        let hash = hash.into();
        self.0.images.set_asset_hash(hash.clone());
        if let Element::View(data) = self.0.view.element() {
            data.asset_hash.set(hash);
        }
    }

    /// Current size of the view in pixels.
    pub fn real_size(&self) -> Vec2 {
        match self.0.view.element() {
            Element::View(data) => data.size.get(),
            _ => self.0.config.size,
        }
    }

    pub fn render(&self, ctx: &mut dyn Context2d) -> VignetteResult<()> {
        self.0.view.render(ctx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;
