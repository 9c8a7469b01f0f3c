use std::fmt;
use syncstack_model::SetOptions;
use syncstack_types::{Encoding, Exchange, PropertyMap};

/// Callback run once an operation has finished and notified.
pub type Completion = Box<dyn FnOnce(&Exchange) + Send>;

/// Per-call options for save, fetch and destroy.
///
/// `silent` only mutes the Change notifications raised while merging the
/// response; the Save/Fetch/Delete notification always fires.
#[derive(Default)]
pub struct SyncOptions {
    pub(crate) only: Option<Vec<String>>,
    pub(crate) difference: bool,
    pub(crate) encoding: Option<Encoding>,
    pub(crate) params: Option<PropertyMap>,
    pub(crate) silent: bool,
    pub(crate) on_complete: Option<Completion>,
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("only", &self.only)
            .field("difference", &self.difference)
            .field("encoding", &self.encoding)
            .field("params", &self.params)
            .field("silent", &self.silent)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends only the named properties when saving.
    pub fn only<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Reduces the save payload to properties that differ from the last
    /// synced snapshot.
    pub fn difference(mut self) -> Self {
        self.difference = true;
        self
    }

    /// Overrides the configured parameter encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Extra request parameters. Merged over the payload on save, sent as the
    /// query string on fetch and destroy.
    pub fn params(mut self, params: PropertyMap) -> Self {
        self.params = Some(params);
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Runs `callback` with the finished exchange.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Exchange) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub(crate) fn set_options(&self) -> SetOptions {
        SetOptions {
            silent: self.silent,
        }
    }
}
