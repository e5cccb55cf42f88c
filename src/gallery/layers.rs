/// Interaction layers in the order they can stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Gallery,
    Lightbox,
    Menu,
}

/// Ordered list of active interceptors. Only the top layer receives pointer
/// and keyboard dispatch; the gallery layer is always at the bottom.
#[derive(Debug, Clone)]
pub struct LayerStack {
    stack: Vec<Layer>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self {
            stack: vec![Layer::Gallery],
        }
    }
}

impl LayerStack {
    pub fn top(&self) -> Layer {
        self.stack.last().copied().unwrap_or(Layer::Gallery)
    }

    /// Bring `layer` to the top, moving it if it is already active.
    pub fn push(&mut self, layer: Layer) {
        self.stack.retain(|l| *l != layer);
        self.stack.push(layer);
        tracing::trace!(?layer, stack = ?self.stack, "layer pushed");
    }

    /// Remove `layer` wherever it sits. Returns `true` if it was active.
    pub fn remove(&mut self, layer: Layer) -> bool {
        if layer == Layer::Gallery {
            return false;
        }
        let before = self.stack.len();
        self.stack.retain(|l| *l != layer);
        before != self.stack.len()
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.stack.contains(&layer)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.stack
    }
}
