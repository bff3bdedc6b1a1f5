use crate::layout::Render;

/// Transitions return a settled copy: scroll clamped to the content and the
/// selection pulled back into the window when it has scrolled out of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    scroll: usize,
    selected: usize,
    height: usize,
}

impl Viewport {
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn visible(&self, render: &Render) -> std::ops::Range<usize> {
        let end = (self.scroll + self.height).min(render.total_height());
        self.scroll.min(end)..end
    }

    #[must_use]
    pub fn resize(self, height: usize, render: &Render) -> Self {
        Self { height, ..self }.settle(render)
    }

    #[must_use]
    pub fn scroll_by(self, delta: isize, render: &Render) -> Self {
        let scroll = self.scroll.saturating_add_signed(delta);
        Self { scroll, ..self }.settle(render)
    }

    #[must_use]
    pub fn page_by(self, pages: isize, render: &Render) -> Self {
        let height = isize::try_from(self.height).unwrap_or(isize::MAX);
        self.scroll_by(pages.saturating_mul(height), render)
    }

    #[must_use]
    pub fn select_next(self, render: &Render) -> Self {
        let last = render.field_count().saturating_sub(1);
        self.select(self.selected.saturating_add(1).min(last), render)
    }

    #[must_use]
    pub fn select_prev(self, render: &Render) -> Self {
        self.select(self.selected.saturating_sub(1), render)
    }

    fn select(self, selected: usize, render: &Render) -> Self {
        let scroll = render
            .field_lines
            .get(selected)
            .copied()
            .unwrap_or(self.scroll);
        Self {
            scroll,
            selected,
            ..self
        }
        .settle(render)
    }

    #[must_use]
    pub fn jump_top(self, render: &Render) -> Self {
        Self { scroll: 0, ..self }.settle(render)
    }

    #[must_use]
    pub fn jump_bottom(self, render: &Render) -> Self {
        let scroll = render.total_height().saturating_sub(self.height);
        Self { scroll, ..self }.settle(render)
    }

    #[must_use]
    pub fn scroll_to(self, line: usize, render: &Render) -> Self {
        Self {
            scroll: line,
            ..self
        }
        .settle(render)
    }

    /// Fresh view for a new document, keeping the window height.
    #[must_use]
    pub fn reset(self, render: &Render) -> Self {
        Self {
            height: self.height,
            ..Self::default()
        }
        .settle(render)
    }

    /// Position saved before a descend, applied at the current height.
    #[must_use]
    pub fn restore(self, saved: Viewport, render: &Render) -> Self {
        Self {
            height: self.height,
            ..saved
        }
        .settle(render)
    }

    fn settle(self, render: &Render) -> Self {
        let max_scroll = render.total_height().saturating_sub(self.height);
        let scroll = self.scroll.min(max_scroll);

        let field_lines = &render.field_lines;
        if field_lines.is_empty() {
            return Self {
                scroll,
                selected: 0,
                ..self
            };
        }

        let mut selected = self.selected.min(field_lines.len() - 1);
        if self.height > 0 {
            let bottom = scroll + self.height - 1;
            let line = field_lines[selected];
            if line < scroll {
                if let Some(index) = field_lines.iter().position(|line| *line >= scroll) {
                    selected = index;
                }
            } else if line > bottom
                && let Some(index) = field_lines.iter().rposition(|line| *line <= bottom)
            {
                selected = index;
            }
        }

        Self {
            scroll,
            selected,
            ..self
        }
    }
}
