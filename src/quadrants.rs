use image::{GenericImage, RgbImage};
use ndarray::{s, Array3, ArrayView3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Half-open pixel bounds: `x0..x1` by `y0..y1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Short name used for the slice-path output files.
    pub fn short_name(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "LU",
            Quadrant::TopRight => "RU",
            Quadrant::BottomLeft => "LD",
            Quadrant::BottomRight => "RD",
        }
    }

    /// 1-based position in `ALL`.
    pub fn number(self) -> usize {
        match self {
            Quadrant::TopLeft => 1,
            Quadrant::TopRight => 2,
            Quadrant::BottomLeft => 3,
            Quadrant::BottomRight => 4,
        }
    }

    /// Bounds within a `width` x `height` frame. With odd sizes the extra
    /// column/row goes to the right/bottom quadrants.
    pub fn bounds(self, width: u32, height: u32) -> Bounds {
        let cx = width / 2;
        let cy = height / 2;

        let (x0, x1) = match self {
            Quadrant::TopLeft | Quadrant::BottomLeft => (0, cx),
            Quadrant::TopRight | Quadrant::BottomRight => (cx, width),
        };
        let (y0, y1) = match self {
            Quadrant::TopLeft | Quadrant::TopRight => (0, cy),
            Quadrant::BottomLeft | Quadrant::BottomRight => (cy, height),
        };

        Bounds { x0, y0, x1, y1 }
    }
}

pub fn crop_quadrants(image: &RgbImage) -> [RgbImage; 4] {
    let (width, height) = image.dimensions();

    Quadrant::ALL.map(|quadrant| {
        let b = quadrant.bounds(width, height);
        image::imageops::crop_imm(image, b.x0, b.y0, b.width(), b.height()).to_image()
    })
}

pub fn slice_quadrants(array: &Array3<u8>) -> [ArrayView3<'_, u8>; 4] {
    let (height, width, _) = array.dim();

    Quadrant::ALL.map(|quadrant| {
        let b = quadrant.bounds(width as u32, height as u32);
        array.slice(s![
            b.y0 as usize..b.y1 as usize,
            b.x0 as usize..b.x1 as usize,
            ..
        ])
    })
}

/// Put four tiles (in `Quadrant::ALL` order) back into one image.
pub fn assemble_quadrants(tiles: &[RgbImage; 4], width: u32, height: u32) -> anyhow::Result<RgbImage> {
    let mut image = RgbImage::new(width, height);

    for (quadrant, tile) in Quadrant::ALL.iter().zip(tiles) {
        let b = quadrant.bounds(width, height);
        anyhow::ensure!(
            tile.dimensions() == (b.width(), b.height()),
            "{:?} tile is {:?}, expected {}x{}",
            quadrant,
            tile.dimensions(),
            b.width(),
            b.height()
        );
        image.copy_from(tile, b.x0, b.y0)?;
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::{array_to_rgb, rgb_to_array};
    use image::Rgb;

    fn noise(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(31) ^ y.wrapping_mul(17);
            Rgb([v as u8, (v >> 3) as u8, (x + y) as u8])
        })
    }

    #[test]
    fn bounds_cover_frame_once() {
        for (width, height) in [(1920, 1080), (7, 5), (1, 1), (2, 3)] {
            let mut hits = vec![0u8; (width * height) as usize];

            for quadrant in Quadrant::ALL {
                let b = quadrant.bounds(width, height);
                for y in b.y0..b.y1 {
                    for x in b.x0..b.x1 {
                        hits[(y * width + x) as usize] += 1;
                    }
                }
            }

            assert!(hits.iter().all(|&h| h == 1), "{}x{}", width, height);
        }
    }

    #[test]
    fn full_hd_quadrants_are_960_by_540() {
        for quadrant in Quadrant::ALL {
            let b = quadrant.bounds(1920, 1080);
            assert_eq!((b.width(), b.height()), (960, 540));
        }
        assert_eq!(
            Quadrant::BottomRight.bounds(1920, 1080),
            Bounds {
                x0: 960,
                y0: 540,
                x1: 1920,
                y1: 1080
            }
        );
    }

    #[test]
    fn crop_and_slice_agree() {
        let image = noise(13, 9);
        let array = rgb_to_array(&image);

        let cropped = crop_quadrants(&image);
        let sliced = slice_quadrants(&array);

        for (crop, slice) in cropped.iter().zip(sliced) {
            assert_eq!(crop, &array_to_rgb(slice).unwrap());
        }
    }

    #[test]
    fn tiles_reassemble_source() {
        let image = noise(13, 9);
        let tiles = crop_quadrants(&image);

        assert_eq!(assemble_quadrants(&tiles, 13, 9).unwrap(), image);
    }

    #[test]
    fn assemble_rejects_wrong_tile_size() {
        let image = noise(8, 8);
        let mut tiles = crop_quadrants(&image);
        tiles[2] = RgbImage::new(3, 3);

        assert!(assemble_quadrants(&tiles, 8, 8).is_err());
    }
}
