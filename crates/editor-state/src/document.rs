/// Column past which [`Document::fill_paragraph`] breaks lines.
pub const DEFAULT_FILL_COLUMN: usize = 72;

/// One open buffer plus the command-level state that goes with it.
#[derive(Debug)]
pub struct Document {
    pub buffer: editor_core::text::TextBuffer,

    /// Text removed by the last kill.
    killed: Vec<u8>,
    fill_column: usize,
}

impl Document {
    pub fn new(buffer: editor_core::text::TextBuffer) -> Self {
        Self {
            buffer,
            killed: Vec::new(),
            fill_column: DEFAULT_FILL_COLUMN,
        }
    }

    #[must_use]
    pub fn with_fill_column(mut self, fill_column: usize) -> Self {
        self.fill_column = fill_column;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        options: editor_core::options::BufferOptions,
    ) -> editor_core::errors::TextBufferResult<Self> {
        editor_core::text::TextBuffer::open(path, options).map(Self::new)
    }

    /// # Errors
    ///
    /// Returns an error if the buffer has no file or the write fails.
    pub fn save(&mut self) -> editor_core::errors::TextBufferResult<()> {
        self.buffer.save()
    }

    #[inline]
    pub fn killed(&self) -> &[u8] {
        &self.killed
    }

    #[inline]
    #[must_use]
    pub fn fill_column(&self) -> usize {
        self.fill_column
    }

    pub fn set_fill_column(&mut self, fill_column: usize) {
        self.fill_column = fill_column;
    }
}

/*

==================
===== MOTION =====
==================

*/

impl Document {
    /// Moves point past the end of the next word. Returns false, with point
    /// at the end of the buffer, when no word follows.
    pub fn forward_word(&mut self) -> bool {
        forward_word(&mut self.buffer)
    }

    /// Moves point to the start of the previous word. Returns false, with
    /// point at the start of the buffer, when no word precedes.
    pub fn backward_word(&mut self) -> bool {
        backward_word(&mut self.buffer)
    }

    /// Puts point on the first non-blank byte of its line.
    pub fn back_to_indentation(&mut self) {
        self.buffer.beginning_of_line();

        let start = self.buffer.point();
        let blanks = self
            .buffer
            .text()
            .chunks_from(start)
            .flatten()
            .take_while(|&&byte| is_blank(byte))
            .count();

        self.buffer.goto(start + blanks);
    }

    /// Moves point past the end of the paragraph, onto the empty line that
    /// follows it or the end of the buffer.
    pub fn forward_paragraph(&mut self) {
        forward_paragraph(&mut self.buffer);
    }

    /// Moves point onto the empty line before the paragraph, or the start
    /// of the buffer.
    pub fn backward_paragraph(&mut self) {
        backward_paragraph(&mut self.buffer);
    }
}

/*

=================
===== MARKS =====
=================

*/

impl Document {
    /// Sets the mark at the end of the next word, leaving point in place.
    pub fn mark_word(&mut self) -> bool {
        self.mark_by(forward_word)
    }

    /// Sets the mark at the start of the previous word, leaving point in
    /// place.
    pub fn mark_word_backward(&mut self) -> bool {
        self.mark_by(backward_word)
    }

    pub fn mark_whole_buffer(&mut self) {
        self.buffer.goto(self.buffer.len());
        self.buffer.set_mark();
        self.buffer.goto(0);
    }

    /// Marks the paragraph around point: mark after it, point before it.
    pub fn mark_paragraph(&mut self) {
        forward_paragraph(&mut self.buffer);
        self.buffer.set_mark();
        backward_paragraph(&mut self.buffer);
    }

    fn mark_by(&mut self, motion: fn(&mut editor_core::text::TextBuffer) -> bool) -> bool {
        let origin = self.buffer.point();
        let moved = motion(&mut self.buffer);

        self.buffer.set_mark();
        self.buffer.goto(origin);

        moved
    }
}

/*

================
===== FILL =====
================

*/

impl Document {
    /// Joins the lines of the paragraph around point and re-breaks them at
    /// blanks so no line passes the fill column where a break exists. One
    /// undo step reverts the whole fill. Point keeps its place in the text.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn fill_paragraph(&mut self) -> editor_core::errors::TextBufferResult<()> {
        if self.buffer.is_read_only() {
            return Err(editor_core::errors::TextBufferError::ReadOnly);
        }

        let fill_column = self.fill_column;
        let origin = self.buffer.create_marker(self.buffer.point());

        let filled = self.buffer.with_sequence(|buffer| {
            forward_paragraph(buffer);

            let mut last = buffer.point_position().line;

            if is_empty_line(buffer, last) {
                last = last.saturating_sub(1);
            }

            backward_paragraph(buffer);

            let mut first = buffer.point_position().line;

            if is_empty_line(buffer, first) {
                first += 1;
            }

            for _ in first..last {
                let end = buffer.line_end(first);

                buffer.delete(end, 1)?;

                let joint = delete_horizontal_space(buffer, end)?;

                buffer.insert(joint, b" ")?;
            }

            let mut line = first;
            let mut breaks = 0;

            while line < buffer.line_count() && break_line(buffer, line, fill_column)? {
                line += 1;
                breaks += 1;
            }

            log::debug!(
                "filled lines {first}..={last} at column {fill_column} with {breaks} breaks"
            );

            Ok::<_, editor_core::errors::TextBufferError>(())
        });

        if let Some(offset) = self.buffer.marker_position(origin) {
            self.buffer.goto(offset);
        }

        self.buffer.release_marker(origin);

        filled
    }
}

/*

====================
===== COMMANDS =====
====================

*/

impl Document {
    /// Types `bytes` at point.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn self_insert(&mut self, bytes: &[u8]) -> editor_core::errors::TextBufferResult<()> {
        self.buffer.insert_at_point(bytes)
    }

    /// Deletes the byte after point. Returns false at the end of the buffer.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn delete_char(&mut self) -> editor_core::errors::TextBufferResult<bool> {
        if self.buffer.eobp() {
            return Ok(false);
        }

        self.buffer.delete(self.buffer.point(), 1)?;

        Ok(true)
    }

    /// Deletes the byte before point. Returns false at the start of the buffer.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn backward_delete_char(&mut self) -> editor_core::errors::TextBufferResult<bool> {
        if self.buffer.bobp() {
            return Ok(false);
        }

        self.buffer.delete(self.buffer.point() - 1, 1)?;

        Ok(true)
    }

    /// Removes the text between point and mark and keeps it as the last
    /// kill. Returns false when no mark is set.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn kill_region(&mut self) -> editor_core::errors::TextBufferResult<bool> {
        let Some(region) = self.buffer.selection() else {
            return Ok(false);
        };

        let text = self.buffer.read_region(&region);

        self.buffer.replace_region(&region, b"")?;
        self.killed = text;

        log::debug!("killed {} bytes at {}", region.size, region.start);

        Ok(true)
    }

    /// Converts the next word at or after point and moves point past it.
    /// Inside a word only the part after point changes. Returns false when
    /// no word follows point.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn case_word(
        &mut self,
        case: editor_core::enums::Case,
    ) -> editor_core::errors::TextBufferResult<bool> {
        let origin = self.buffer.point();

        if !forward_word(&mut self.buffer) {
            self.buffer.goto(origin);
            return Ok(false);
        }

        let end = self.buffer.point();

        backward_word(&mut self.buffer);

        let region = self.buffer.region(self.buffer.point().max(origin), end);
        let mut word = self.buffer.read_region(&region);

        case.apply(&mut word);
        self.buffer.replace_region(&region, &word)?;
        self.buffer.goto(end);

        Ok(true)
    }

    /// Replaces every match of `find` between point and the end of the
    /// buffer, as one undo step. Returns the number of replacements.
    ///
    /// A search string without upper-case letters matches regardless of
    /// case, and each replacement then copies the case of what it replaces.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn replace_string(
        &mut self,
        find: &[u8],
        replacement: &[u8],
    ) -> editor_core::errors::TextBufferResult<usize> {
        if self.buffer.is_read_only() {
            return Err(editor_core::errors::TextBufferError::ReadOnly);
        }

        if find.is_empty() {
            return Ok(0);
        }

        let fold_case = editor_core::search::no_upper(find, false);

        let count = self.buffer.with_sequence(|buffer| {
            let mut count = 0;
            let mut pos = buffer.point();

            while let Some(found) =
                editor_core::search::search_forward(buffer.text(), pos, find, fold_case)
            {
                let region = buffer.region(found, found + find.len());
                let text = if fold_case {
                    adapt_case(&buffer.read_region(&region), replacement)
                } else {
                    replacement.to_vec()
                };

                buffer.replace_region(&region, &text)?;
                pos = found + text.len();
                buffer.goto(pos);
                count += 1;
            }

            Ok::<_, editor_core::errors::TextBufferError>(count)
        })?;

        log::debug!("replaced {count} occurrences");

        Ok(count)
    }

    /// # Errors
    ///
    /// See [`editor_core::errors::UndoError`].
    pub fn undo(&mut self) -> Result<(), editor_core::errors::UndoError> {
        self.buffer.undo()
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

fn is_empty_line(buffer: &editor_core::text::TextBuffer, line: usize) -> bool {
    buffer.line_start(line) == buffer.line_end(line)
}

/// Skips to the next word byte, then past the word. Crosses line breaks.
fn forward_word(buffer: &mut editor_core::text::TextBuffer) -> bool {
    let mut pos = buffer.point();
    let mut in_word = false;

    for &byte in buffer.text().chunks_from(pos).flatten() {
        if is_word_byte(byte) {
            in_word = true;
        } else if in_word {
            break;
        }

        pos += 1;
    }

    buffer.goto(pos);

    in_word
}

fn backward_word(buffer: &mut editor_core::text::TextBuffer) -> bool {
    let mut pos = buffer.point();
    let mut in_word = false;

    for &byte in buffer
        .text()
        .chunks_rev(pos)
        .flat_map(|chunk| chunk.iter().rev())
    {
        if is_word_byte(byte) {
            in_word = true;
        } else if in_word {
            break;
        }

        pos -= 1;
    }

    buffer.goto(pos);

    in_word
}

fn forward_paragraph(buffer: &mut editor_core::text::TextBuffer) {
    let last = buffer.line_count() - 1;
    let mut line = buffer.point_position().line;

    while line < last && is_empty_line(buffer, line) {
        line += 1;
    }

    while line < last && !is_empty_line(buffer, line) {
        line += 1;
    }

    if is_empty_line(buffer, line) {
        buffer.goto(buffer.line_start(line));
    } else {
        buffer.goto(buffer.line_end(line));
    }
}

fn backward_paragraph(buffer: &mut editor_core::text::TextBuffer) {
    let mut line = buffer.point_position().line;

    while line > 0 && is_empty_line(buffer, line) {
        line -= 1;
    }

    while line > 0 && !is_empty_line(buffer, line) {
        line -= 1;
    }

    buffer.goto(buffer.line_start(line));
}

/// Deletes the blanks around `pos` and returns where they started.
fn delete_horizontal_space(
    buffer: &mut editor_core::text::TextBuffer,
    pos: usize,
) -> editor_core::errors::TextBufferResult<usize> {
    let text = buffer.text();
    let before = text
        .chunks_rev(pos)
        .flat_map(|chunk| chunk.iter().rev())
        .take_while(|&&byte| is_blank(byte))
        .count();
    let after = text
        .chunks_from(pos)
        .flatten()
        .take_while(|&&byte| is_blank(byte))
        .count();

    if before + after > 0 {
        buffer.delete(pos - before, before + after)?;
    }

    Ok(pos - before)
}

/// Breaks `line` at the last blank run that keeps it within `fill_column`,
/// or at the first blank run when the leading word is already too long.
/// Returns false when the line fits or has nowhere to break.
fn break_line(
    buffer: &mut editor_core::text::TextBuffer,
    line: usize,
    fill_column: usize,
) -> editor_core::errors::TextBufferResult<bool> {
    let start = buffer.line_start(line);
    let end = buffer.line_end(line);

    if end - start <= fill_column {
        return Ok(false);
    }

    let bytes = buffer.read_region(&buffer.region(start, end));
    let breaks_at = |idx: &usize| is_blank(bytes[*idx]) && !is_blank(bytes[*idx - 1]);
    let cut = (1..=fill_column.min(bytes.len() - 1))
        .rev()
        .find(breaks_at)
        .or_else(|| (fill_column + 1..bytes.len()).find(breaks_at));

    let Some(cut) = cut else {
        return Ok(false);
    };

    let blanks = bytes[cut..].iter().take_while(|&&byte| is_blank(byte)).count();

    if cut + blanks == bytes.len() {
        return Ok(false);
    }

    let run = buffer.region(start + cut, start + cut + blanks);

    buffer.replace_region(&run, b"\n")?;

    Ok(true)
}

/// Gives `replacement` the case pattern of `matched`: all upper case, or a
/// capital first letter. Anything else leaves it as typed.
fn adapt_case(matched: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut letters = matched.iter().filter(|byte| byte.is_ascii_alphabetic());
    let Some(first) = letters.next() else {
        return replacement.to_vec();
    };

    let mut adapted = replacement.to_vec();

    if !first.is_ascii_uppercase() {
        return adapted;
    }

    if matched.len() > 1 && letters.all(u8::is_ascii_uppercase) {
        editor_core::enums::Case::Upper.apply(&mut adapted);
    } else if let Some(byte) = adapted.first_mut() {
        *byte = byte.to_ascii_uppercase();
    }

    adapted
}
