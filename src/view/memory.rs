//! In-memory surface: records region state for embedders and tests.

use std::collections::BTreeMap;

use super::{ImageHandle, Region, SelectOption, Surface};

/// An image element inside the avatar container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    pub handle: ImageHandle,
    pub source: Option<String>,
}

/// Surface that keeps everything in memory. All regions start hidden.
#[derive(Debug, Default)]
pub struct MemorySurface {
    visible: BTreeMap<Region, bool>,
    texts: BTreeMap<Region, String>,
    options: Vec<SelectOption>,
    images: Vec<AvatarImage>,
    next_image: u64,
}

impl MemorySurface {
    pub fn is_visible(&self, region: Region) -> bool {
        self.visible.get(&region).copied().unwrap_or(false)
    }

    /// Text content of a region; empty when never set.
    pub fn text(&self, region: Region) -> &str {
        self.texts.get(&region).map(String::as_str).unwrap_or("")
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn images(&self) -> &[AvatarImage] {
        &self.images
    }

    /// Source of the avatar image, if exactly one exists.
    pub fn avatar_source(&self) -> Option<&str> {
        match self.images.as_slice() {
            [only] => only.source.as_deref(),
            _ => None,
        }
    }
}

impl Surface for MemorySurface {
    fn set_visible(&mut self, region: Region, visible: bool) {
        self.visible.insert(region, visible);
    }

    fn set_text(&mut self, region: Region, text: &str) {
        self.texts.insert(region, text.to_string());
    }

    fn set_options(&mut self, options: &[SelectOption]) {
        self.options = options.to_vec();
    }

    fn create_avatar_image(&mut self, source: Option<&str>) -> ImageHandle {
        self.next_image += 1;
        let handle = ImageHandle(self.next_image);
        self.images.push(AvatarImage {
            handle,
            source: source.map(str::to_string),
        });
        handle
    }

    fn set_image_source(&mut self, image: ImageHandle, source: Option<&str>) {
        match self.images.iter_mut().find(|i| i.handle == image) {
            Some(existing) => existing.source = source.map(str::to_string),
            None => tracing::warn!(?image, "image handle not found on surface"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_start_hidden_and_empty() {
        let surface = MemorySurface::default();
        assert!(!surface.is_visible(Region::Loading));
        assert_eq!(surface.text(Region::ErrorText), "");
        assert!(surface.options().is_empty());
        assert_eq!(surface.avatar_source(), None);
    }

    #[test]
    fn images_get_distinct_handles() {
        let mut surface = MemorySurface::default();
        let a = surface.create_avatar_image(Some("/a.png"));
        let b = surface.create_avatar_image(None);
        assert_ne!(a, b);
        surface.set_image_source(b, Some("/b.png"));
        assert_eq!(surface.images()[1].source.as_deref(), Some("/b.png"));
        // Two images: no single avatar.
        assert_eq!(surface.avatar_source(), None);
    }
}
