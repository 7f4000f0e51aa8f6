//! Two ways of turning a raw frame into an RGB image: through the `image`
//! crate's buffers, and through an `ndarray` reshape.

use crate::frame::{FrameError, FrameLayout, PixelOrder, RawFrame};
use image::{ImageBuffer, Rgb, RgbImage, Rgba};
use ndarray::{s, Array3, ArrayView3};

/// Four channel image still in the frame's own channel order.
///
/// `image` has no BGRA pixel type, so BGRA frames are held as `Rgba<u8>`
/// with red and blue swapped; `layout.order` says which is which.
pub type PackedImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

pub fn decode_packed(frame: RawFrame, layout: &FrameLayout) -> Result<PackedImage, FrameError> {
    layout.check(frame.len())?;

    let len = frame.len();
    ImageBuffer::from_raw(layout.width, layout.height, frame.into_bytes()).ok_or(
        FrameError::LengthMismatch {
            expected: layout.expected_len().unwrap_or(usize::MAX),
            actual: len,
        },
    )
}

pub fn packed_to_rgb(image: &PackedImage, order: PixelOrder) -> RgbImage {
    let [r, g, b] = order.rgb_offsets();
    let pixels: &[[u8; 4]] = bytemuck::cast_slice(image.as_raw().as_slice());

    let mut rgb = RgbImage::new(image.width(), image.height());
    for (out, pixel) in rgb.chunks_exact_mut(3).zip(pixels) {
        out.copy_from_slice(&[pixel[r], pixel[g], pixel[b]]);
    }

    rgb
}

/// Reshape the frame into a `(height, width, 4)` array without copying.
pub fn reshape_packed(frame: RawFrame, layout: &FrameLayout) -> Result<Array3<u8>, FrameError> {
    layout.check(frame.len())?;

    Ok(Array3::from_shape_vec(
        (layout.height as usize, layout.width as usize, 4),
        frame.into_bytes(),
    )?)
}

/// Drop alpha by slicing the channel axis; BGRA is reversed into RGB by the
/// slice step so no per-pixel loop is needed.
pub fn drop_alpha(array: &Array3<u8>, order: PixelOrder) -> Array3<u8> {
    match order {
        PixelOrder::Bgra => array.slice(s![.., .., ..3;-1]).to_owned(),
        PixelOrder::Rgba => array.slice(s![.., .., ..3]).to_owned(),
    }
}

/// Copy a `(height, width, 3)` view into an `RgbImage`.
pub fn array_to_rgb(view: ArrayView3<u8>) -> anyhow::Result<RgbImage> {
    let (height, width, channels) = view.dim();
    anyhow::ensure!(
        channels == 3,
        "expected 3 channels, array has {}",
        channels
    );

    let raw: Vec<u8> = view.iter().copied().collect();

    RgbImage::from_raw(width as u32, height as u32, raw)
        .ok_or_else(|| anyhow::anyhow!("array of {}x{} does not fit an RGB image", width, height))
}

pub fn rgb_to_array(image: &RgbImage) -> Array3<u8> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        let Rgb(pixel) = *image.get_pixel(x as u32, y as u32);
        pixel[c]
    })
}
