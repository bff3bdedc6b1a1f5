use crate::viewport::Viewport;

#[derive(Debug, Clone, Default)]
pub struct History {
    frames: Vec<Viewport>,
}

impl History {
    pub fn push(&mut self, viewport: Viewport) {
        self.frames.push(viewport);
    }

    pub fn pop(&mut self) -> Option<Viewport> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
