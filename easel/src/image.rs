//! Raster data carried by image grobs and patterns.

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;

/// Shared, immutable raster bytes in their encoded (on-disk) form.
///
/// Decoding happens in the rendering backend; the core only carries the
/// bytes. With the `image` feature enabled the pixel dimensions can be
/// probed without a backend.
#[derive(Clone, Debug)]
pub struct ImageData {
    bytes: Arc<[u8]>,
    source: Option<String>,
}

impl PartialEq for ImageData {
    fn eq(&self, other: &ImageData) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes) || self.bytes == other.bytes
    }
}

impl ImageData {
    /// Wrap already-loaded encoded bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> ImageData {
        ImageData {
            bytes: bytes.into().into(),
            source: None,
        }
    }

    /// Read an image file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ImageData, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(ImageData {
            bytes: bytes.into(),
            source: Some(path.display().to_string()),
        })
    }

    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The originating file path, when the data came from disk.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Decode just enough of the data to learn its pixel dimensions.
    #[cfg(feature = "image")]
    pub fn pixel_size(&self) -> Result<(u32, u32), Error> {
        use crate::error::{new_error, ErrorKind};
        use ::image::GenericImageView;

        let img = ::image::load_from_memory(&self.bytes)
            .map_err(|e| new_error(ErrorKind::BackendError(Box::new(e))))?;
        Ok(img.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_content() {
        let a = ImageData::from_bytes(vec![1, 2, 3]);
        let b = ImageData::from_bytes(vec![1, 2, 3]);
        let c = ImageData::from_bytes(vec![9]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.clone(), a);
    }
}
