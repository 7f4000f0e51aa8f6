//! Raw frame buffers as they come off disk: no header, 4 bytes per pixel.

use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frame layout {width}x{height} has no pixels")]
    EmptyLayout { width: u32, height: u32 },

    #[error("frame layout {width}x{height} is too large to address")]
    Oversized { width: u32, height: u32 },

    #[error("frame layout {width}x{height} cannot be split into quadrants")]
    TooSmallToSplit { width: u32, height: u32 },

    #[error("frame is {actual} bytes, expected {expected} for the given layout")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("failed to reshape frame: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Channel order of the 4-byte pixels in a raw frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelOrder {
    Bgra,
    Rgba,
}

impl PixelOrder {
    /// Offsets of red, green and blue within one pixel.
    pub fn rgb_offsets(self) -> [usize; 3] {
        match self {
            PixelOrder::Bgra => [2, 1, 0],
            PixelOrder::Rgba => [0, 1, 2],
        }
    }
}

impl Default for PixelOrder {
    fn default() -> Self {
        PixelOrder::Bgra
    }
}

impl FromStr for PixelOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bgra" => Ok(PixelOrder::Bgra),
            "rgba" => Ok(PixelOrder::Rgba),
            other => Err(anyhow::anyhow!("unknown pixel order {:?}, expected bgra or rgba", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub order: PixelOrder,
}

impl FrameLayout {
    pub fn new(width: u32, height: u32, order: PixelOrder) -> Self {
        Self {
            width,
            height,
            order,
        }
    }

    /// Byte length of a frame with this layout, `None` if it overflows `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }

    pub fn check(&self, len: usize) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyLayout {
                width: self.width,
                height: self.height,
            });
        }

        let expected = self.expected_len().ok_or(FrameError::Oversized {
            width: self.width,
            height: self.height,
        })?;

        if len != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: len,
            });
        }

        Ok(())
    }

    /// Every quadrant needs at least one pixel in each direction.
    pub fn check_splittable(&self) -> Result<(), FrameError> {
        if self.width < 2 || self.height < 2 {
            return Err(FrameError::TooSmallToSplit {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::new(1920, 1080, PixelOrder::Bgra)
    }
}

/// An opaque byte sequence read from storage in one go.
#[derive(Clone, Debug)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn load(path: &Path) -> Result<Self, FrameError> {
        let bytes = std::fs::read(path).map_err(|source| FrameError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("read {} bytes from {}", bytes.len(), path.display());

        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_length_passes() {
        let layout = FrameLayout::new(3, 2, PixelOrder::Bgra);
        assert_eq!(layout.expected_len(), Some(24));
        assert!(layout.check(24).is_ok());
    }

    #[test]
    fn short_and_long_buffers_are_rejected() {
        let layout = FrameLayout::new(3, 2, PixelOrder::Bgra);

        match layout.check(23) {
            Err(FrameError::LengthMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (24, 23));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            layout.check(28),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn empty_layout_is_rejected() {
        let layout = FrameLayout::new(0, 10, PixelOrder::Rgba);
        assert!(matches!(layout.check(0), Err(FrameError::EmptyLayout { .. })));
    }

    #[test]
    fn huge_layout_does_not_overflow() {
        let layout = FrameLayout::new(u32::MAX, u32::MAX, PixelOrder::Bgra);
        assert_eq!(layout.expected_len(), None);
        assert!(matches!(layout.check(0), Err(FrameError::Oversized { .. })));
    }

    #[test]
    fn single_row_or_column_cannot_be_split() {
        for (width, height) in [(1, 4), (4, 1), (1, 1)] {
            let layout = FrameLayout::new(width, height, PixelOrder::Bgra);
            assert!(layout.check(layout.expected_len().unwrap()).is_ok());
            assert!(matches!(
                layout.check_splittable(),
                Err(FrameError::TooSmallToSplit { .. })
            ));
        }
        assert!(FrameLayout::new(2, 2, PixelOrder::Bgra).check_splittable().is_ok());
    }

    #[test]
    fn missing_file_names_the_path() {
        let path = std::env::temp_dir().join("frame-bench-does-not-exist.bgra");
        let err = RawFrame::load(&path).unwrap_err();
        assert!(err.to_string().contains("frame-bench-does-not-exist.bgra"));
    }

    #[test]
    fn pixel_order_parses() {
        assert_eq!("BGRA".parse::<PixelOrder>().unwrap(), PixelOrder::Bgra);
        assert_eq!("rgba".parse::<PixelOrder>().unwrap(), PixelOrder::Rgba);
        assert!("argb".parse::<PixelOrder>().is_err());
    }
}
