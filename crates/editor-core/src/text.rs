/// The full contents of one open document plus everything that moves with
/// them: the point, the markers, the mark and the undo log.
///
/// - Offsets are flat byte positions. `Point`s are derived from the newline
///   counts cached in the sequence.
/// - Every mutation goes through [`TextBuffer::replace_region`], which records
///   undo before touching the text and shifts markers in the same step.
/// - Positions outside the document are clamped, never rejected.
#[derive(Debug)]
pub struct TextBuffer {
    pub(crate) text: crate::rblist::Seq,
    pub(crate) balancer: crate::rblist::Balancer,

    /// Offset of the edit cursor.
    pub(crate) point: usize,
    pub(crate) markers: crate::marker::MarkerSet,
    pub(crate) mark: Option<crate::marker::MarkerId>,
    pub(crate) undo: crate::undo::UndoLog,

    /// Unsaved changes exist.
    pub(crate) modified: bool,
    pub(crate) read_only: bool,

    /// Raised on every change; the display takes it when it redraws.
    pub(crate) needs_resync: bool,

    filepath: Option<std::path::PathBuf>,
}

/*

==================================
===== CREATION, OPEN, & SAVE =====
==================================

*/

impl TextBuffer {
    /// Creates an empty buffer with no file behind it.
    #[must_use]
    pub fn new(options: crate::options::BufferOptions) -> Self {
        Self::from_bytes(b"", options)
    }

    /// Creates a buffer holding `bytes`. The buffer starts unmodified.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], options: crate::options::BufferOptions) -> Self {
        let mut balancer = options.balancer();
        let text = balancer.from_bytes(bytes);

        Self {
            text,
            balancer,
            point: 0,
            markers: crate::marker::MarkerSet::new(),
            mark: None,
            undo: crate::undo::UndoLog::new(options.undo_enabled),
            modified: false,
            read_only: options.read_only,
            needs_resync: true,
            filepath: None,
        }
    }

    /// Loads a file into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, lacks read permissions,
    /// or if the memory mapping operation fails.
    pub fn open<P: AsRef<std::path::Path>>(
        path: P,
        options: crate::options::BufferOptions,
    ) -> crate::errors::TextBufferResult<Self> {
        let mapped = io::mmap::MappedFile::open(path.as_ref())?;
        let mut buffer = Self::from_bytes(mapped.as_slice(), options);

        buffer.filepath = Some(mapped.path().to_path_buf());

        log::debug!(
            "opened {} ({} bytes, {} lines)",
            mapped.path().display(),
            buffer.len(),
            buffer.line_count()
        );

        Ok(buffer)
    }

    /// Writes the buffer to its file atomically and marks it unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`TextBufferError::NoFilePath`](crate::errors::TextBufferError::NoFilePath)
    /// if the buffer was never tied to a file, or an I/O error if the
    /// staging file cannot be written or renamed.
    pub fn save(&mut self) -> crate::errors::TextBufferResult<()> {
        let filepath = self
            .filepath
            .as_ref()
            .ok_or(crate::errors::TextBufferError::NoFilePath)?;

        let written = io::atomic::write_atomic(filepath, self.text.chunks())?;

        log::debug!("saved {} ({written} bytes)", filepath.display());

        self.modified = false;
        self.undo.clear_unchanged();
        self.needs_resync = true;

        Ok(())
    }

    /// Ties the buffer to `path` and saves it there.
    ///
    /// # Errors
    ///
    /// Returns an error if the new destination cannot be written to.
    pub fn save_as<P: AsRef<std::path::Path>>(
        &mut self,
        path: P,
    ) -> crate::errors::TextBufferResult<()> {
        self.filepath = Some(path.as_ref().to_path_buf());

        self.save()
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl TextBuffer {
    /// Number of lines. An empty buffer, or one ending in a newline, still
    /// has a final (possibly empty) line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.newlines() + 1
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.filepath.as_deref()
    }

    /// The current contents, shared with the buffer.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &crate::rblist::Seq {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn undo_log(&self) -> &crate::undo::UndoLog {
        &self.undo
    }

    #[inline]
    #[must_use]
    pub fn point(&self) -> usize {
        self.point
    }

    #[inline]
    #[must_use]
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl TextBuffer {
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.text.to_bytes()
    }

    /// The region between two offsets, in either order.
    #[must_use]
    pub fn region(&self, a: usize, b: usize) -> crate::point::Region {
        crate::point::Region::new(&self.text, a, b)
    }

    /// Copies the bytes of `region` out of the buffer.
    #[must_use]
    pub fn read_region(&self, region: &crate::point::Region) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(region.size);

        for chunk in self.text.chunks_from(region.start) {
            let wanted = region.size - bytes.len();

            if wanted == 0 {
                break;
            }

            bytes.extend_from_slice(&chunk[..wanted.min(chunk.len())]);
        }

        bytes
    }

    /// The bytes of `region` as a sequence sharing structure with the buffer.
    pub fn region_seq(&mut self, region: &crate::point::Region) -> crate::rblist::Seq {
        self.balancer
            .substring(&self.text, region.start, region.end)
    }

    /// The byte at point, `None` at the end of the buffer.
    #[must_use]
    pub fn following_byte(&self) -> Option<u8> {
        self.text.get(self.point)
    }

    /// The byte before point, `None` at the start of the buffer.
    #[must_use]
    pub fn preceding_byte(&self) -> Option<u8> {
        self.point.checked_sub(1).and_then(|pos| self.text.get(pos))
    }
}

/*

==============================
===== POINT & NAVIGATION =====
==============================

*/

impl TextBuffer {
    /// Offset of the first byte of `line`. Lines past the end clamp to the
    /// last line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.text.newlines());

        self.text.line_start(line).unwrap_or(self.text.len())
    }

    /// Offset of the terminator ending `line`, or the buffer length on the
    /// last line.
    #[must_use]
    pub fn line_end(&self, line: usize) -> usize {
        if line >= self.text.newlines() {
            return self.text.len();
        }

        self.text
            .line_start(line + 1)
            .map_or(self.text.len(), |next| next - 1)
    }

    #[must_use]
    pub fn position_of(&self, offset: usize) -> crate::point::Point {
        let offset = offset.min(self.text.len());
        let line = self.text.newlines_before(offset);

        crate::point::Point::new(line, offset - self.line_start(line))
    }

    /// Resolves a (line, column) pair. Both coordinates are clamped, the
    /// column to the length of its line.
    #[must_use]
    pub fn offset_of(&self, point: crate::point::Point) -> usize {
        let line = point.line.min(self.text.newlines());
        let start = self.line_start(line);
        let end = self.line_end(line);

        start + point.column.min(end - start)
    }

    #[must_use]
    pub fn point_position(&self) -> crate::point::Point {
        self.position_of(self.point)
    }

    pub fn goto(&mut self, offset: usize) {
        self.point = offset.min(self.text.len());
    }

    pub fn goto_point(&mut self, point: crate::point::Point) {
        self.point = self.offset_of(point);
    }

    /// Moves point one byte forward. Returns false at the end of the buffer.
    pub fn forward_char(&mut self) -> bool {
        if self.eobp() {
            return false;
        }

        self.point += 1;
        true
    }

    /// Moves point one byte backward. Returns false at the start of the buffer.
    pub fn backward_char(&mut self) -> bool {
        if self.bobp() {
            return false;
        }

        self.point -= 1;
        true
    }

    pub fn beginning_of_line(&mut self) {
        let line = self.text.newlines_before(self.point);

        self.point = self.line_start(line);
    }

    pub fn end_of_line(&mut self) {
        let line = self.text.newlines_before(self.point);

        self.point = self.line_end(line);
    }

    #[must_use]
    pub fn bolp(&self) -> bool {
        self.preceding_byte().is_none_or(|byte| byte == b'\n')
    }

    #[must_use]
    pub fn eolp(&self) -> bool {
        self.following_byte().is_none_or(|byte| byte == b'\n')
    }

    #[must_use]
    pub fn bobp(&self) -> bool {
        self.point == 0
    }

    #[must_use]
    pub fn eobp(&self) -> bool {
        self.point >= self.text.len()
    }
}

/*

=========================
===== MARKS & FLAGS =====
=========================

*/

impl TextBuffer {
    /// Starts tracking `offset` (clamped).
    pub fn create_marker(&mut self, offset: usize) -> crate::marker::MarkerId {
        self.markers.create(offset.min(self.text.len()))
    }

    pub fn release_marker(&mut self, id: crate::marker::MarkerId) -> bool {
        if self.mark == Some(id) {
            self.mark = None;
        }

        self.markers.release(id)
    }

    #[must_use]
    pub fn marker_position(&self, id: crate::marker::MarkerId) -> Option<usize> {
        self.markers.position(id)
    }

    /// Sets the mark at point.
    pub fn set_mark(&mut self) {
        self.set_mark_at(self.point);
    }

    pub fn set_mark_at(&mut self, offset: usize) {
        let offset = offset.min(self.text.len());

        if let Some(mark) = self.mark
            && self.markers.set_position(mark, offset)
        {
            return;
        }

        self.mark = Some(self.markers.create(offset));
    }

    #[must_use]
    pub fn mark(&self) -> Option<usize> {
        self.mark.and_then(|mark| self.markers.position(mark))
    }

    pub fn clear_mark(&mut self) {
        if let Some(mark) = self.mark.take() {
            self.markers.release(mark);
        }
    }

    /// Swaps point and mark. Returns false when no mark is set.
    pub fn exchange_point_and_mark(&mut self) -> bool {
        let Some(mark) = self.mark else {
            return false;
        };
        let Some(offset) = self.markers.position(mark) else {
            return false;
        };

        self.markers.set_position(mark, self.point);
        self.point = offset;

        true
    }

    /// The region between point and mark, if the mark is set.
    #[must_use]
    pub fn selection(&self) -> Option<crate::point::Region> {
        self.mark().map(|mark| self.region(self.point, mark))
    }

    pub fn toggle_read_only(&mut self) -> bool {
        self.read_only = !self.read_only;
        self.read_only
    }

    pub fn set_undo_enabled(&mut self, enabled: bool) {
        self.undo.set_enabled(enabled);
    }

    /// Returns the resync hint and lowers it.
    pub fn take_resync(&mut self) -> bool {
        std::mem::take(&mut self.needs_resync)
    }
}

/*

===================
===== EDITING =====
===================

*/

impl TextBuffer {
    /// Replaces `region` with `bytes`.
    ///
    /// The old contents are recorded for undo first. Point and markers are
    /// shifted in the same step, so a point inside the region lands on its
    /// start and a point after it keeps its distance from the end.
    ///
    /// # Errors
    ///
    /// Returns [`TextBufferError::ReadOnly`](crate::errors::TextBufferError::ReadOnly)
    /// on read-only buffers; nothing is recorded or changed.
    pub fn replace_region(
        &mut self,
        region: &crate::point::Region,
        bytes: &[u8],
    ) -> crate::errors::TextBufferResult<()> {
        if self.read_only {
            return Err(crate::errors::TextBufferError::ReadOnly);
        }

        // The caller's region may predate other edits.
        let region = self.region(region.start, region.end);

        self.record(
            crate::enums::DeltaKind::ReplaceBlock,
            region.start,
            region.size,
            bytes.len(),
            crate::enums::Recording::Command,
        );

        let replacement = self.balancer.from_bytes(bytes);

        self.splice(&region, &replacement);

        Ok(())
    }

    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) -> crate::errors::TextBufferResult<()> {
        let region = crate::point::Region::empty_at(&self.text, offset);

        self.replace_region(&region, bytes)
    }

    /// Deletes up to `count` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn delete(&mut self, offset: usize, count: usize) -> crate::errors::TextBufferResult<()> {
        let region = self.region(offset, offset.saturating_add(count));

        self.replace_region(&region, b"")
    }

    /// Inserts at point and leaves point after the new text.
    ///
    /// # Errors
    ///
    /// Fails on read-only buffers.
    pub fn insert_at_point(&mut self, bytes: &[u8]) -> crate::errors::TextBufferResult<()> {
        // An empty region at point: the point is at its end and moves along.
        self.insert(self.point, bytes)
    }

    /// Rewrites the text without recording anything.
    pub(crate) fn splice(
        &mut self,
        region: &crate::point::Region,
        replacement: &crate::rblist::Seq,
    ) {
        let new_len = replacement.len();

        self.text = self
            .balancer
            .splice(&self.text, region.start, region.end, replacement);
        self.markers.adjust(region.start, region.end, new_len);
        self.point = crate::marker::adjust_offset(self.point, region.start, region.end, new_len);
        self.modified = true;
        self.needs_resync = true;

        log::trace!(
            "replaced [{}, {}) with {} bytes, length now {}",
            region.start,
            region.end,
            new_len,
            self.text.len()
        );
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.text.chunks() {
            // Leaves can cut a multi-byte character in half.
            write!(f, "{}", String::from_utf8_lossy(chunk))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod text_buffer_tests {
    use super::*;
    use crate::options::BufferOptions;
    use crate::point::Point;
    use std::io::Write;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_bytes(text.as_bytes(), BufferOptions::default().with_seed(7))
    }

    fn text_of(buffer: &TextBuffer) -> String {
        String::from_utf8(buffer.to_bytes()).unwrap()
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buffer = TextBuffer::new(BufferOptions::default());

        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.point_position(), Point::new(0, 0));
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_line_count_and_positions() {
        let buffer = buffer("Line 1\nLine 2\nLine 3\n");

        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.position_of(0), Point::new(0, 0));
        assert_eq!(buffer.position_of(9), Point::new(1, 2));
        assert_eq!(buffer.position_of(21), Point::new(3, 0));
        assert_eq!(buffer.position_of(500), Point::new(3, 0));

        assert_eq!(buffer.line_start(2), 14);
        assert_eq!(buffer.line_end(2), 20);
        assert_eq!(buffer.line_end(3), 21);
    }

    #[test]
    fn test_offset_of_clamps_column() {
        let buffer = buffer("ab\nlonger line\nx");

        assert_eq!(buffer.offset_of(Point::new(0, 10)), 2);
        assert_eq!(buffer.offset_of(Point::new(1, 3)), 6);
        assert_eq!(buffer.offset_of(Point::new(9, 0)), 15);
    }

    #[test]
    fn test_read_region_across_leaves() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let buffer = buffer(&text);
        let region = buffer.region(700, 37);

        assert_eq!(buffer.read_region(&region), text.as_bytes()[37..700]);
        assert_eq!(region.size, 663);
    }

    #[test]
    fn test_replace_region_updates_text_and_flags() {
        let mut buffer = buffer("hello world");
        let region = buffer.region(0, 5);

        buffer.take_resync();
        buffer.replace_region(&region, b"HI").unwrap();

        assert_eq!(text_of(&buffer), "HI world");
        assert!(buffer.is_modified());
        assert!(buffer.take_resync());
        assert!(!buffer.needs_resync());
    }

    #[test]
    fn test_point_follows_edits() {
        let mut buffer = buffer("0123456789abcdefghijklmnopqrstuvwxyz");

        buffer.goto(20);
        buffer.insert(10, b"+++++").unwrap();
        assert_eq!(buffer.point(), 25);

        buffer.goto(12);
        buffer.delete(10, 5).unwrap();
        assert_eq!(buffer.point(), 10);

        buffer.goto(5);
        buffer.delete(10, 3).unwrap();
        assert_eq!(buffer.point(), 5);
    }

    #[test]
    fn test_insert_at_point_moves_point_after_text() {
        let mut buffer = buffer("ac");

        buffer.goto(1);
        buffer.insert_at_point(b"b").unwrap();

        assert_eq!(text_of(&buffer), "abc");
        assert_eq!(buffer.point(), 2);
    }

    #[test]
    fn test_markers_follow_edits() {
        let mut buffer = buffer("some text that is long enough to span several leaves");
        let marker = buffer.create_marker(20);

        buffer.insert(0, b"12345").unwrap();
        assert_eq!(buffer.marker_position(marker), Some(25));

        assert!(buffer.release_marker(marker));
        assert_eq!(buffer.marker_position(marker), None);
    }

    #[test]
    fn test_read_only_refuses_edits() {
        let mut buffer = TextBuffer::from_bytes(
            b"locked",
            BufferOptions::default().with_read_only(true),
        );

        let result = buffer.insert(0, b"x");

        assert!(matches!(
            result,
            Err(crate::errors::TextBufferError::ReadOnly)
        ));
        assert_eq!(text_of(&buffer), "locked");
        assert!(buffer.undo_log().is_empty());

        assert!(!buffer.toggle_read_only());
        buffer.insert(0, b"un").unwrap();
        assert_eq!(text_of(&buffer), "unlocked");
    }

    #[test]
    fn test_navigation_predicates() {
        let mut buffer = buffer("ab\ncd");

        assert!(buffer.bobp() && buffer.bolp());
        assert_eq!(buffer.preceding_byte(), None);

        buffer.end_of_line();
        assert_eq!(buffer.point(), 2);
        assert!(buffer.eolp() && !buffer.eobp());
        assert_eq!(buffer.following_byte(), Some(b'\n'));

        assert!(buffer.forward_char());
        assert!(buffer.bolp());
        assert_eq!(buffer.point_position(), Point::new(1, 0));

        buffer.goto(4);
        buffer.beginning_of_line();
        assert_eq!(buffer.point(), 3);

        buffer.goto_point(Point::new(1, 2));
        assert!(buffer.eobp());
        assert!(!buffer.forward_char());

        buffer.goto(0);
        assert!(!buffer.backward_char());
    }

    #[test]
    fn test_mark_and_selection() {
        let mut buffer = buffer("alpha beta gamma");

        assert_eq!(buffer.selection(), None);

        buffer.goto(6);
        buffer.set_mark();
        buffer.goto(10);

        let region = buffer.selection().unwrap();
        assert_eq!((region.start, region.end), (6, 10));

        assert!(buffer.exchange_point_and_mark());
        assert_eq!(buffer.point(), 6);
        assert_eq!(buffer.mark(), Some(10));

        // The mark is a marker and follows edits before it.
        buffer.insert(0, b">> ").unwrap();
        assert_eq!(buffer.mark(), Some(13));

        buffer.clear_mark();
        assert_eq!(buffer.mark(), None);
        assert!(!buffer.exchange_point_and_mark());
    }

    #[test]
    fn test_display_and_region_seq() {
        let mut buffer = buffer("shared structure");
        let region = buffer.region(7, 16);

        assert_eq!(buffer.to_string(), "shared structure");
        assert_eq!(buffer.region_seq(&region).to_bytes(), b"structure");
    }

    #[test]
    fn test_open_and_save() {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        file.write_all(b"Original text").unwrap();
        file.as_file().sync_all().unwrap();

        let mut buffer = TextBuffer::open(file.path(), BufferOptions::default()).unwrap();

        assert_eq!(text_of(&buffer), "Original text");
        assert_eq!(buffer.path(), Some(file.path()));

        buffer.insert(buffer.len(), b" plus edits").unwrap();
        assert!(buffer.is_modified());

        buffer.save().unwrap();

        assert!(!buffer.is_modified());
        assert_eq!(std::fs::read(file.path()).unwrap(), b"Original text plus edits");
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = buffer("scratch");

        assert!(matches!(
            buffer.save(),
            Err(crate::errors::TextBufferError::NoFilePath)
        ));
    }

    #[test]
    fn test_save_as_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("notes.txt");
        let mut buffer = buffer("fresh\n");

        buffer.insert(0, b"a ").unwrap();
        buffer.save_as(&target).unwrap();

        assert_eq!(buffer.path(), Some(target.as_path()));
        assert_eq!(std::fs::read(&target).unwrap(), b"a fresh\n");

        let reopened = TextBuffer::open(&target, BufferOptions::default()).unwrap();
        assert_eq!(reopened.line_count(), 2);
    }
}
