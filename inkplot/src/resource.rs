//! Encoded image sources, compared by identity.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An opaque, encoded source image (PNG, BMP, ...).
///
/// Cloning is cheap; all clones share one allocation and compare equal.
/// Equality and hashing are by *identity*, not content: two sources
/// built from identical bytes are distinct cache entries. This mirrors
/// how callers hold on to one image object across frames, and it makes
/// the cache key free to compute.
#[derive(Clone, Debug)]
pub struct ImageSource {
    data: Arc<[u8]>,
}

impl ImageSource {
    /// Wrap encoded image bytes. The bytes are never inspected here;
    /// decoding happens in the surface when the image is first drawn.
    pub fn new(data: impl Into<Arc<[u8]>>) -> ImageSource {
        ImageSource { data: data.into() }
    }

    /// The raw encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &ImageSource) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for ImageSource {}

impl Hash for ImageSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.data) as *const u8 as usize).hash(state);
    }
}
