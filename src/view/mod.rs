//! The page surface the selector drives.
//!
//! A [`Surface`] owns five named regions (loading indicator, selection
//! control, chart container, error text, avatar container) plus the avatar
//! image. The selector and the chart renderer share one surface through
//! [`SharedSurface`]; renderers only ever see [`RegionHandle`]s.

pub mod memory;
pub mod terminal;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use strum::{Display, EnumIter};

pub use memory::MemorySurface;
pub use terminal::TerminalSurface;

/// Named regions of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Region {
    Loading,
    Selector,
    Chart,
    ErrorText,
    Avatar,
}

/// One entry of the selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Opaque reference to an image element created by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// Rendering target for the selector.
pub trait Surface {
    /// Show or hide a region.
    fn set_visible(&mut self, region: Region, visible: bool);

    /// Replace the text content of a region (error text, chart body).
    fn set_text(&mut self, region: Region, text: &str);

    /// Replace every option of the selection control, in order.
    fn set_options(&mut self, options: &[SelectOption]);

    /// Create an image inside the avatar container.
    fn create_avatar_image(&mut self, source: Option<&str>) -> ImageHandle;

    /// Point an existing image at a new source.
    fn set_image_source(&mut self, image: ImageHandle, source: Option<&str>);
}

/// Surface shared between the selector and in-flight renders.
pub type SharedSurface = Arc<Mutex<dyn Surface + Send>>;

/// Lock a shared surface, recovering from a poisoned lock.
pub(crate) fn lock(surface: &SharedSurface) -> MutexGuard<'_, dyn Surface + Send + 'static> {
    surface.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Monotonic counter of selection changes. Handles issued under an older
/// generation become inert.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance and return the new generation.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Capability to update a single region on behalf of one selection.
///
/// Every mutation is dropped once the selection that issued the handle has
/// been superseded; mutators report whether they took effect.
#[derive(Clone)]
pub struct RegionHandle {
    surface: SharedSurface,
    region: Region,
    issued: u64,
    generation: Generation,
}

impl std::fmt::Debug for RegionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionHandle")
            .field("region", &self.region)
            .field("issued", &self.issued)
            .field("current", &self.is_current())
            .finish()
    }
}

impl RegionHandle {
    pub(crate) fn new(surface: SharedSurface, region: Region, generation: &Generation) -> Self {
        Self {
            surface,
            region,
            issued: generation.current(),
            generation: generation.clone(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Whether the selection that issued this handle is still the latest.
    pub fn is_current(&self) -> bool {
        self.generation.current() == self.issued
    }

    pub fn show(&self) -> bool {
        self.apply(|s, r| s.set_visible(r, true))
    }

    pub fn hide(&self) -> bool {
        self.apply(|s, r| s.set_visible(r, false))
    }

    pub fn set_text(&self, text: &str) -> bool {
        self.apply(|s, r| s.set_text(r, text))
    }

    fn apply(&self, f: impl FnOnce(&mut (dyn Surface + Send + 'static), Region)) -> bool {
        let mut surface = lock(&self.surface);
        // Checked under the lock so a concurrent selection change cannot
        // interleave between the check and the write.
        if !self.is_current() {
            tracing::debug!(region = %self.region, issued = self.issued, "dropping stale region update");
            return false;
        }
        f(&mut *surface, self.region);
        true
    }
}
