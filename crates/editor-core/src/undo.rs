/// Index of a delta in its buffer's [`UndoLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeltaId(usize);

/// One recorded, reversible change.
#[derive(Debug, Clone)]
pub struct Delta {
    pub kind: crate::enums::DeltaKind,
    pub pos: usize,
    /// The bytes that occupied `[pos, pos + old_size)` before the change.
    /// Empty for bracket deltas.
    pub text: crate::rblist::Seq,
    pub old_size: usize,
    pub new_size: usize,
    /// The buffer had no unsaved changes when this delta was recorded.
    pub unchanged: bool,
    /// The delta recorded just before this one.
    pub next: Option<DeltaId>,
}

/// Every delta recorded for a buffer, newest first through `next`.
///
/// Nothing is ever dropped. Undoing records compensating deltas in turn, so
/// walking past the oldest delta and starting over replays undone edits.
#[derive(Debug, Clone)]
pub struct UndoLog {
    deltas: Vec<Delta>,
    /// Where the next `undo` starts.
    next_undo: Option<DeltaId>,
    /// The newest delta.
    last_undo: Option<DeltaId>,
    enabled: bool,
}

impl UndoLog {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            deltas: Vec::new(),
            next_undo: None,
            last_undo: None,
            enabled,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn next_undo(&self) -> Option<DeltaId> {
        self.next_undo
    }

    #[inline]
    #[must_use]
    pub fn last_undo(&self) -> Option<DeltaId> {
        self.last_undo
    }

    #[must_use]
    pub fn get(&self, id: DeltaId) -> Option<&Delta> {
        self.deltas.get(id.0)
    }

    /// Links `delta` in as the newest entry. Command edits also move the
    /// undo cursor to it; compensating deltas leave the cursor where the
    /// undo walk is.
    pub(crate) fn push(&mut self, mut delta: Delta, recording: crate::enums::Recording) -> DeltaId {
        let id = DeltaId(self.deltas.len());

        delta.next = self.last_undo;
        self.deltas.push(delta);
        self.last_undo = Some(id);

        if recording == crate::enums::Recording::Command {
            self.next_undo = Some(id);
        }

        id
    }

    /// Forgets which deltas led back to the saved state. Called once the
    /// buffer has been written out, since the file now holds newer content.
    pub fn clear_unchanged(&mut self) {
        for delta in &mut self.deltas {
            delta.unchanged = false;
        }
    }
}

/// An open undo bracket. Derefs to the buffer; the closing delta is
/// recorded when the guard goes out of scope, on every exit path.
#[derive(Debug)]
pub struct SequenceGuard<'buf> {
    buffer: &'buf mut crate::text::TextBuffer,
}

impl std::ops::Deref for SequenceGuard<'_> {
    type Target = crate::text::TextBuffer;

    fn deref(&self) -> &Self::Target {
        self.buffer
    }
}

impl std::ops::DerefMut for SequenceGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer
    }
}

impl Drop for SequenceGuard<'_> {
    fn drop(&mut self) {
        self.buffer.end_sequence();
    }
}

/*

=====================
===== RECORDING =====
=====================

*/

impl crate::text::TextBuffer {
    /// Records a bracket delta at `pos`.
    ///
    /// Only `StartSequence` and `EndSequence` are accepted here. Edits record
    /// their own `ReplaceBlock` through [`TextBuffer::replace_region`], so a
    /// `ReplaceBlock` passed in is refused and `None` returned. Also `None`
    /// while undo is disabled.
    ///
    /// [`TextBuffer::replace_region`]: crate::text::TextBuffer::replace_region
    pub fn undo_save(
        &mut self,
        kind: crate::enums::DeltaKind,
        pos: usize,
        old_size: usize,
        new_size: usize,
    ) -> Option<DeltaId> {
        if kind == crate::enums::DeltaKind::ReplaceBlock {
            log::debug!("refused a raw ReplaceBlock at {pos}");

            return None;
        }

        self.record(kind, pos, old_size, new_size, crate::enums::Recording::Command)
    }

    pub(crate) fn record(
        &mut self,
        kind: crate::enums::DeltaKind,
        pos: usize,
        old_size: usize,
        new_size: usize,
        recording: crate::enums::Recording,
    ) -> Option<DeltaId> {
        if !self.undo.is_enabled() {
            return None;
        }

        let text = match kind {
            crate::enums::DeltaKind::ReplaceBlock => {
                self.balancer
                    .substring(&self.text, pos, pos.saturating_add(old_size))
            }
            _ => crate::rblist::Seq::empty(),
        };

        let delta = Delta {
            kind,
            pos,
            text,
            old_size,
            new_size,
            unchanged: !self.modified,
            next: None,
        };

        Some(self.undo.push(delta, recording))
    }

    /// Opens a group of edits undone as one step.
    pub fn begin_sequence(&mut self) {
        log::debug!("undo sequence opened at {}", self.point);

        self.undo_save(crate::enums::DeltaKind::StartSequence, self.point, 0, 0);
    }

    pub fn end_sequence(&mut self) {
        log::debug!("undo sequence closed at {}", self.point);

        self.undo_save(crate::enums::DeltaKind::EndSequence, self.point, 0, 0);
    }

    /// Opens a bracket closed by the returned guard.
    pub fn sequence(&mut self) -> SequenceGuard<'_> {
        self.begin_sequence();

        SequenceGuard { buffer: self }
    }

    /// Runs `f` inside a bracket.
    pub fn with_sequence<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let mut guard = self.sequence();

        f(&mut *guard)
    }
}

/*

================
===== UNDO =====
================

*/

impl crate::text::TextBuffer {
    /// Reverts the next step of history.
    ///
    /// # Errors
    ///
    /// - `UndoError::Disabled` / `UndoError::ReadOnly`: nothing happens.
    /// - `UndoError::NoFurtherUndo`: the walk is past the oldest delta. The
    ///   next call starts again from the newest one.
    /// - `UndoError::UnbalancedSequence`: a bracket had no opening delta.
    pub fn undo(&mut self) -> Result<(), crate::errors::UndoError> {
        if !self.undo.is_enabled() {
            return Err(crate::errors::UndoError::Disabled);
        }

        if self.read_only {
            return Err(crate::errors::UndoError::ReadOnly);
        }

        let Some(next) = self.undo.next_undo else {
            self.undo.next_undo = self.undo.last_undo;

            return Err(crate::errors::UndoError::NoFurtherUndo);
        };

        match self.revert(next) {
            Ok(after) => {
                self.undo.next_undo = after;

                log::debug!("undo reverted {next:?}, point now {}", self.point);

                Ok(())
            }
            Err(error) => {
                self.undo.next_undo = None;

                log::debug!("undo stopped at {next:?}: {error}");

                Err(error)
            }
        }
    }

    /// Reverts `id` (a whole bracket if `id` closes one) and returns the
    /// delta to continue from.
    fn revert(&mut self, id: DeltaId) -> Result<Option<DeltaId>, crate::errors::UndoError> {
        let Some(delta) = self.undo.get(id).cloned() else {
            return Err(crate::errors::UndoError::NoFurtherUndo);
        };

        match delta.kind {
            crate::enums::DeltaKind::EndSequence => self.revert_sequence(&delta),
            crate::enums::DeltaKind::StartSequence => {
                self.goto(delta.pos);

                Ok(delta.next)
            }
            crate::enums::DeltaKind::ReplaceBlock => {
                let region = self.region(delta.pos, delta.pos.saturating_add(delta.new_size));

                self.record(
                    crate::enums::DeltaKind::ReplaceBlock,
                    region.start,
                    region.size,
                    delta.text.len(),
                    crate::enums::Recording::Undo,
                );
                self.splice(&region, &delta.text);
                self.goto(delta.pos);

                if delta.unchanged {
                    self.modified = false;
                }

                Ok(delta.next)
            }
        }
    }

    /// Reverts everything between `end` and its opening delta, recording the
    /// compensation as a bracket of its own.
    fn revert_sequence(
        &mut self,
        end: &Delta,
    ) -> Result<Option<DeltaId>, crate::errors::UndoError> {
        let undo = crate::enums::Recording::Undo;

        self.record(crate::enums::DeltaKind::StartSequence, end.pos, 0, 0, undo);

        let mut cursor = end.next;

        loop {
            let Some(current) = cursor else {
                self.record(crate::enums::DeltaKind::EndSequence, self.point, 0, 0, undo);

                return Err(crate::errors::UndoError::UnbalancedSequence);
            };

            if let Some(start) = self.undo.get(current)
                && start.kind == crate::enums::DeltaKind::StartSequence
            {
                let (pos, next) = (start.pos, start.next);

                self.record(crate::enums::DeltaKind::EndSequence, pos, 0, 0, undo);
                self.goto(pos);

                return Ok(next);
            }

            cursor = match self.revert(current) {
                Ok(next) => next,
                Err(error) => {
                    self.record(crate::enums::DeltaKind::EndSequence, self.point, 0, 0, undo);

                    return Err(error);
                }
            };
        }
    }
}
