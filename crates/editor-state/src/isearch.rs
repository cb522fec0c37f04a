/// Which way an incremental search scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// State of one incremental search.
///
/// Point follows the current match: past its end when searching forward,
/// on its start when searching backward. The search folds case while the
/// pattern has no upper-case letter.
#[derive(Debug)]
pub struct IncrementalSearch {
    direction: Direction,
    /// Point when the search began.
    origin: usize,
    pattern: Vec<u8>,
    /// Start of the current match.
    matched: Option<usize>,
    failing: bool,
}

impl IncrementalSearch {
    #[must_use]
    pub fn begin(buffer: &editor_core::text::TextBuffer, direction: Direction) -> Self {
        Self {
            direction,
            origin: buffer.point(),
            pattern: Vec::new(),
            matched: None,
            failing: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    #[inline]
    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.failing
    }

    #[inline]
    #[must_use]
    pub fn current_match(&self) -> Option<usize> {
        self.matched
    }

    /// Extends the pattern and searches again from the current match.
    pub fn push(&mut self, buffer: &mut editor_core::text::TextBuffer, bytes: &[u8]) -> bool {
        self.pattern.extend_from_slice(bytes);

        let anchor = self.matched.unwrap_or(self.origin);
        let bound = match self.direction {
            Direction::Forward => anchor,
            Direction::Backward => self.matched.map_or(self.origin, |start| {
                start + self.pattern.len()
            }),
        };

        self.search(buffer, bound)
    }

    /// Drops the last pattern byte and searches again from the origin.
    pub fn pop(&mut self, buffer: &mut editor_core::text::TextBuffer) -> bool {
        self.pattern.pop();
        self.matched = None;
        self.failing = false;

        if self.pattern.is_empty() {
            buffer.goto(self.origin);

            return true;
        }

        self.search(buffer, self.origin)
    }

    /// Moves to the next match in the search direction.
    pub fn repeat(&mut self, buffer: &mut editor_core::text::TextBuffer) -> bool {
        if self.pattern.is_empty() {
            return false;
        }

        let bound = match (self.direction, self.matched) {
            (Direction::Forward, Some(start)) => start + 1,
            (Direction::Backward, Some(start)) => start + self.pattern.len() - 1,
            (_, None) => self.origin,
        };

        self.search(buffer, bound)
    }

    /// Ends the search at the current match and leaves the mark where the
    /// search started.
    pub fn finish(self, buffer: &mut editor_core::text::TextBuffer) {
        if buffer.point() != self.origin {
            buffer.set_mark_at(self.origin);
        }

        log::debug!("isearch finished at {}", buffer.point());
    }

    /// Abandons the search and puts point back where it started.
    pub fn cancel(self, buffer: &mut editor_core::text::TextBuffer) {
        buffer.goto(self.origin);

        log::debug!("isearch cancelled, point back at {}", self.origin);
    }

    fn search(&mut self, buffer: &mut editor_core::text::TextBuffer, bound: usize) -> bool {
        let fold_case = editor_core::search::no_upper(&self.pattern, false);
        let found = match self.direction {
            Direction::Forward => {
                editor_core::search::search_forward(buffer.text(), bound, &self.pattern, fold_case)
            }
            Direction::Backward => editor_core::search::search_backward(
                buffer.text(),
                bound,
                &self.pattern,
                fold_case,
            ),
        };

        let Some(start) = found else {
            self.failing = true;

            return false;
        };

        self.matched = Some(start);
        self.failing = false;

        match self.direction {
            Direction::Forward => buffer.goto(start + self.pattern.len()),
            Direction::Backward => buffer.goto(start),
        }

        true
    }
}
