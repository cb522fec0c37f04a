/// Per-buffer settings chosen when a buffer is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferOptions {
    /// Seed for the sequence shape. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Whether edits are recorded for `undo`.
    pub undo_enabled: bool,
    pub read_only: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            seed: None,
            undo_enabled: true,
            read_only: false,
        }
    }
}

impl BufferOptions {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_undo(mut self, enabled: bool) -> Self {
        self.undo_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub(crate) fn balancer(&self) -> crate::rblist::Balancer {
        match self.seed {
            Some(seed) => crate::rblist::Balancer::seeded(seed),
            None => crate::rblist::Balancer::new(),
        }
    }
}
