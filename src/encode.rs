use crate::frame::{FrameLayout, PixelOrder, RawFrame};
use anyhow::Context;
use image::codecs::qoi::QoiEncoder;
use image::{ImageEncoder, ImageFormat, RgbImage};
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subsampling {
    /// Full chroma resolution.
    S444,
    /// Chroma halved horizontally.
    S422,
    /// Chroma halved in both directions.
    S420,
}

impl Subsampling {
    fn sampling_factor(self) -> SamplingFactor {
        match self {
            Subsampling::S444 => SamplingFactor::F_1_1,
            Subsampling::S422 => SamplingFactor::F_2_1,
            Subsampling::S420 => SamplingFactor::F_2_2,
        }
    }
}

impl FromStr for Subsampling {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "4:4:4" | "444" => Ok(Subsampling::S444),
            "4:2:2" | "422" => Ok(Subsampling::S422),
            "4:2:0" | "420" => Ok(Subsampling::S420),
            other => anyhow::bail!("unknown subsampling {:?}, expected 4:4:4, 4:2:2 or 4:2:0", other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegSettings {
    pub quality: u8,
    pub subsampling: Subsampling,
}

impl Default for JpegSettings {
    fn default() -> Self {
        Self {
            quality: 100,
            subsampling: Subsampling::S420,
        }
    }
}

impl JpegSettings {
    pub fn new(quality: u8, subsampling: Subsampling) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=100).contains(&quality),
            "quality must be within 1..=100, got {}",
            quality
        );

        Ok(Self {
            quality,
            subsampling,
        })
    }
}

fn jpeg_dimension(value: u32) -> anyhow::Result<u16> {
    u16::try_from(value).with_context(|| format!("{} pixels is too large for a JPEG", value))
}

fn encode_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
    settings: &JpegSettings,
) -> anyhow::Result<Vec<u8>> {
    let width = jpeg_dimension(width)?;
    let height = jpeg_dimension(height)?;

    let mut output = Vec::new();
    let mut encoder = Encoder::new(&mut output, settings.quality);
    encoder.set_sampling_factor(settings.subsampling.sampling_factor());
    encoder.encode(data, width, height, color_type)?;

    Ok(output)
}

pub fn encode_rgb(image: &RgbImage, settings: &JpegSettings) -> anyhow::Result<Vec<u8>> {
    encode_raw(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgb,
        settings,
    )
}

/// Encode a raw 4-channel frame as-is; the encoder ignores alpha.
pub fn encode_packed(
    frame: &RawFrame,
    layout: &FrameLayout,
    settings: &JpegSettings,
) -> anyhow::Result<Vec<u8>> {
    layout.check(frame.len())?;

    let color_type = match layout.order {
        PixelOrder::Bgra => ColorType::Bgra,
        PixelOrder::Rgba => ColorType::Rgba,
    };

    encode_raw(
        frame.as_bytes(),
        layout.width,
        layout.height,
        color_type,
        settings,
    )
}

/// Encode and write to `path`, returning the encoded size in bytes.
pub fn save_rgb(image: &RgbImage, path: &Path, settings: &JpegSettings) -> anyhow::Result<usize> {
    let bytes = encode_rgb(image, settings)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    write_jpeg(path, &bytes)?;
    Ok(bytes.len())
}

pub fn write_jpeg(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Lossless QOI encode of an RGB image, for comparison against JPEG.
pub fn encode_qoi(image: &RgbImage) -> anyhow::Result<Vec<u8>> {
    let mut output = Vec::new();
    QoiEncoder::new(&mut output).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(output)
}

pub fn decode_qoi(bytes: &[u8]) -> anyhow::Result<RgbImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Qoi)?.into_rgb8())
}
