/// Weak handle to a tracked position.
///
/// The buffer owns the offset; a handle that was released (or whose slot was
/// recycled) simply resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId {
    slot: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    offset: usize,
    generation: u32,
    live: bool,
}

/// Every live marker of one buffer.
#[derive(Debug, Default, Clone)]
pub struct MarkerSet {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl MarkerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, offset: usize) -> MarkerId {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot];

            entry.offset = offset;
            entry.live = true;

            return MarkerId {
                slot,
                generation: entry.generation,
            };
        }

        self.slots.push(Slot {
            offset,
            generation: 0,
            live: true,
        });

        MarkerId {
            slot: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Stops tracking `id`. Returns false for an unknown or stale handle.
    pub fn release(&mut self, id: MarkerId) -> bool {
        let Some(entry) = self.slot_mut(id) else {
            return false;
        };

        entry.live = false;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);

        true
    }

    #[must_use]
    pub fn position(&self, id: MarkerId) -> Option<usize> {
        self.slots
            .get(id.slot)
            .filter(|entry| entry.live && entry.generation == id.generation)
            .map(|entry| entry.offset)
    }

    /// Moves a live marker. Returns false for an unknown or stale handle.
    pub fn set_position(&mut self, id: MarkerId, offset: usize) -> bool {
        match self.slot_mut(id) {
            Some(entry) => {
                entry.offset = offset;
                true
            }
            None => false,
        }
    }

    /// Number of live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shifts every live marker for a replacement of `[start, end)` by
    /// `new_len` bytes.
    pub fn adjust(&mut self, start: usize, end: usize, new_len: usize) {
        for entry in self.slots.iter_mut().filter(|entry| entry.live) {
            entry.offset = adjust_offset(entry.offset, start, end, new_len);
        }
    }

    fn slot_mut(&mut self, id: MarkerId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.slot)
            .filter(|entry| entry.live && entry.generation == id.generation)
    }
}

/// Where `offset` lands after `[start, end)` is replaced by `new_len` bytes.
///
/// Offsets at or past `end` move with the text after the edit, offsets
/// inside the replaced span collapse to `start`.
#[inline]
#[must_use]
pub fn adjust_offset(offset: usize, start: usize, end: usize, new_len: usize) -> usize {
    if offset >= end {
        offset - (end - start) + new_len
    } else if offset >= start {
        start
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_shifts_following_markers() {
        let mut markers = MarkerSet::new();
        let after = markers.create(20);
        let before = markers.create(5);
        let at = markers.create(10);

        // Five bytes inserted at offset 10.
        markers.adjust(10, 10, 5);

        assert_eq!(markers.position(after), Some(25));
        assert_eq!(markers.position(before), Some(5));
        assert_eq!(markers.position(at), Some(15));
    }

    #[test]
    fn test_delete_collapses_interior_markers() {
        let mut markers = MarkerSet::new();
        let inside = markers.create(12);
        let after = markers.create(15);
        let start = markers.create(10);

        // [10, 15) deleted.
        markers.adjust(10, 15, 0);

        assert_eq!(markers.position(inside), Some(10));
        assert_eq!(markers.position(after), Some(10));
        assert_eq!(markers.position(start), Some(10));
    }

    #[test]
    fn test_replace_shifts_by_length_difference() {
        assert_eq!(adjust_offset(30, 10, 20, 4), 24);
        assert_eq!(adjust_offset(19, 10, 20, 4), 10);
        assert_eq!(adjust_offset(9, 10, 20, 4), 9);
    }

    #[test]
    fn test_release_and_stale_handles() {
        let mut markers = MarkerSet::new();
        let first = markers.create(3);

        assert!(markers.release(first));
        assert!(!markers.release(first));
        assert_eq!(markers.position(first), None);

        // The slot is recycled; the old handle must not see the new marker.
        let second = markers.create(8);

        assert_eq!(markers.position(first), None);
        assert_eq!(markers.position(second), Some(8));
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn test_released_markers_are_not_adjusted() {
        let mut markers = MarkerSet::new();
        let kept = markers.create(4);
        let dropped = markers.create(6);

        markers.release(dropped);
        markers.adjust(0, 0, 2);

        assert_eq!(markers.position(kept), Some(6));
        assert!(!markers.set_position(dropped, 1));
    }
}
