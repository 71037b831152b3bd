//! The boundary to the resource loader.
//!
//! The parser never fetches anything itself. Script sources the parser has
//! to wait for and speculative preload hints are both handed to a
//! [`ResourceLoader`]; the host decides what to do with them.

use strum_macros::{Display, EnumIter};

/// What a requested URL is going to be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// `<script src>`
    Script,
    /// `<img src>`
    Image,
    /// `<link rel=stylesheet href>` and `@import`
    Stylesheet,
}

/// Opaque ticket for a requested resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub usize);

/// Receiver of fetch requests.
pub trait ResourceLoader {
    /// Start (or look up) the fetch of `url`.
    fn request(&mut self, url: &str, kind: ResourceKind) -> ResourceHandle;

    /// Mark a request as a speculative hint from the preload scanner. The
    /// loader may lower its priority or drop it entirely.
    fn register_preload(&mut self, handle: ResourceHandle);
}

/// A request seen by a [`RecordingLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// The handle given out for it.
    pub handle: ResourceHandle,
    /// Absolute (or base-less) URL.
    pub url: String,
    /// Intended use.
    pub kind: ResourceKind,
}

/// A loader that fetches nothing and remembers every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    requests: Vec<ResourceRequest>,
    preloads: Vec<ResourceHandle>,
}

impl RecordingLoader {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request, in order.
    #[must_use]
    pub fn requests(&self) -> &[ResourceRequest] {
        &self.requests
    }

    /// Requests registered as preload hints, in order.
    #[must_use]
    pub fn preloads(&self) -> Vec<&ResourceRequest> {
        self.preloads
            .iter()
            .filter_map(|handle| self.find(*handle))
            .collect()
    }

    /// Look a request up by its handle.
    #[must_use]
    pub fn find(&self, handle: ResourceHandle) -> Option<&ResourceRequest> {
        self.requests.iter().find(|r| r.handle == handle)
    }
}

impl ResourceLoader for RecordingLoader {
    fn request(&mut self, url: &str, kind: ResourceKind) -> ResourceHandle {
        if let Some(existing) = self.requests.iter().find(|r| r.url == url && r.kind == kind) {
            return existing.handle;
        }
        let handle = ResourceHandle(self.requests.len());
        log::debug!(target: "wren::loader", "request {kind} {url}");
        self.requests.push(ResourceRequest {
            handle,
            url: url.to_string(),
            kind,
        });
        handle
    }

    fn register_preload(&mut self, handle: ResourceHandle) {
        if !self.preloads.contains(&handle) {
            self.preloads.push(handle);
        }
    }
}
