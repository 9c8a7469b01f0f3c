/// Options accepted by property and membership mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Suppress the notification the mutation would otherwise publish.
    pub silent: bool,
}

impl SetOptions {
    /// Options that suppress notifications.
    #[must_use]
    pub const fn silent() -> Self {
        Self { silent: true }
    }
}
