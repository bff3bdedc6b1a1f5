use crate::document::Document;
use crate::history::History;
use crate::input::Action;
use crate::layout::{DEFAULT_WRAP_WIDTH, Render, render};
use crate::search::{Direction, compile, search};
use crate::viewport::Viewport;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

const PATTERN_NOT_FOUND: &str = "pattern not found";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    Pattern,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HighlightStyle {
    Field,
    SelectedField,
    SearchMatch,
}

/// Styled byte range of one render line. Later highlights paint over earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub line: usize,
    pub columns: Range<usize>,
    pub style: HighlightStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub wrap_width: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

pub struct App {
    running: bool,
    mode: InputMode,
    document: Document,
    render: Render,
    viewport: Viewport,
    history: History,
    input: String,
    pattern: Option<Regex>,
    status: String,
    config: SessionConfig,
}

impl App {
    pub fn new(document: Document, config: SessionConfig) -> Self {
        let render = render(&document, config.wrap_width);
        Self {
            running: true,
            mode: InputMode::Normal,
            document,
            render,
            viewport: Viewport::default(),
            history: History::default(),
            input: String::new(),
            pattern: None,
            status: String::new(),
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn render(&self) -> &Render {
        &self.render
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    /// Sets the number of content lines the screen can show.
    pub fn resize(&mut self, height: usize) {
        self.viewport = self.viewport.resize(height, &self.render);
    }

    /// Lines currently inside the window, with their render line index.
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.viewport
            .visible(&self.render)
            .map(|index| (index, self.render.lines[index].as_str()))
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.running = false;
            }
            Action::ScrollDown => self.viewport = self.viewport.scroll_by(1, &self.render),
            Action::ScrollUp => self.viewport = self.viewport.scroll_by(-1, &self.render),
            Action::PageDown => self.viewport = self.viewport.page_by(1, &self.render),
            Action::PageUp => self.viewport = self.viewport.page_by(-1, &self.render),
            Action::NextField => self.viewport = self.viewport.select_next(&self.render),
            Action::PrevField => self.viewport = self.viewport.select_prev(&self.render),
            Action::Top => self.viewport = self.viewport.jump_top(&self.render),
            Action::Bottom => self.viewport = self.viewport.jump_bottom(&self.render),
            Action::Descend => self.descend(),
            Action::Ascend => self.ascend(),
            Action::StartSearch => {
                self.mode = InputMode::Pattern;
                self.input.clear();
            }
            Action::SearchNext => self.repeat_search(Direction::Forward),
            Action::SearchPrev => self.repeat_search(Direction::Backward),
            Action::SubmitInput => self.submit_pattern(),
            Action::CancelInput => self.leave_pattern_mode(),
            Action::Backspace => {
                if self.input.pop().is_none() {
                    self.leave_pattern_mode();
                }
            }
            Action::DeleteWord => {
                while self.input.ends_with(' ') {
                    self.input.pop();
                }
                while !self.input.ends_with(' ') && !self.input.is_empty() {
                    self.input.pop();
                }
            }
            Action::InputChar(c) => self.input.push(c),
        }
    }

    /// Field spans, the selected field and pattern matches inside the window.
    pub fn highlights(&self) -> Vec<Highlight> {
        let visible = self.viewport.visible(&self.render);
        let mut highlights = Vec::new();

        for (index, (line, columns)) in self
            .render
            .field_lines
            .iter()
            .zip(&self.render.field_columns)
            .enumerate()
        {
            if !visible.contains(line) {
                continue;
            }
            let style = if index == self.viewport.selected() {
                HighlightStyle::SelectedField
            } else {
                HighlightStyle::Field
            };
            highlights.push(Highlight {
                line: *line,
                columns: columns.clone(),
                style,
            });
        }

        if let Some(pattern) = &self.pattern {
            for (line, text) in self.visible_lines() {
                for found in pattern.find_iter(text).filter(|found| !found.is_empty()) {
                    highlights.push(Highlight {
                        line,
                        columns: found.range(),
                        style: HighlightStyle::SearchMatch,
                    });
                }
            }
        }
        highlights
    }

    fn set_document(&mut self, document: Document) {
        self.render = render(&document, self.config.wrap_width);
        self.document = document;
    }

    fn descend(&mut self) {
        let Some(child) = self.document.descend(self.viewport.selected()) else {
            return;
        };
        debug!(path = %child.full_path(), "descend");
        self.history.push(self.viewport);
        self.set_document(child);
        self.viewport = self.viewport.reset(&self.render);
    }

    fn ascend(&mut self) {
        let Some(parent) = self.document.ascend() else {
            return;
        };
        debug!(path = %parent.full_path(), "ascend");
        self.set_document(parent);
        self.viewport = match self.history.pop() {
            Some(saved) => self.viewport.restore(saved, &self.render),
            None => self.viewport.reset(&self.render),
        };
    }

    fn leave_pattern_mode(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
    }

    fn submit_pattern(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.mode = InputMode::Normal;

        if input.is_empty() {
            self.pattern = None;
            self.status.clear();
            return;
        }
        match compile(&input) {
            Ok(pattern) => {
                self.pattern = Some(pattern);
                self.repeat_search(Direction::Forward);
            }
            Err(error) => {
                debug!(%input, %error, "rejected search pattern");
                self.status = error.to_string();
            }
        }
    }

    fn repeat_search(&mut self, direction: Direction) {
        let Some(pattern) = &self.pattern else {
            return;
        };
        match search(&self.render.lines, self.viewport.scroll(), direction, pattern) {
            Some(line) => {
                debug!(line, ?direction, "search hit");
                self.viewport = self.viewport.scroll_to(line, &self.render);
                self.status.clear();
            }
            None => self.status = PATTERN_NOT_FOUND.to_string(),
        }
    }
}
