//! The tile benchmark: read a raw frame, convert it, and time whole-frame
//! versus per-quadrant JPEG encoding through both the `image` and the
//! `ndarray` paths.

use crate::encode::{self, JpegSettings};
use crate::frame::{FrameLayout, RawFrame};
use crate::pixels;
use crate::quadrants::{self, Quadrant};
use crate::timing::PhaseTimer;
use anyhow::Context;
use image::RgbImage;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub layout: FrameLayout,
    pub jpeg: JpegSettings,
    /// Also encode the 4-channel frame without converting it first.
    pub direct: bool,
    /// Also time a lossless QOI encode and decode of the RGB image.
    pub qoi: bool,
    /// Compare the two paths' results and log mismatches.
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("1920.bgra"),
            output_dir: PathBuf::from("."),
            layout: FrameLayout::default(),
            jpeg: JpegSettings::default(),
            direct: false,
            qoi: false,
            verify: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OutputFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Verification {
    pub conversions_match: bool,
    pub tiles_match: bool,
    pub reassembles: bool,
    /// Whether the QOI output decoded back to the source, when it was run.
    pub qoi_round_trip: Option<bool>,
}

impl Verification {
    pub fn all_ok(&self) -> bool {
        self.conversions_match
            && self.tiles_match
            && self.reassembles
            && self.qoi_round_trip != Some(false)
    }
}

#[derive(Debug)]
pub struct BenchReport {
    pub timer: PhaseTimer,
    pub outputs: Vec<OutputFile>,
    pub verification: Option<Verification>,
}

/// Make `workdir` (or, failing that, the directory holding the running
/// executable) the current directory and return it.
pub fn enter_workdir(workdir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = match workdir {
        Some(dir) => dir.to_path_buf(),
        None => {
            let exe = std::env::current_exe().context("failed to locate the running executable")?;
            exe.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", exe.display()))?
        }
    };

    std::env::set_current_dir(&dir)
        .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    let cwd = std::env::current_dir()?;
    log::info!("working directory: {}", cwd.display());

    Ok(cwd)
}

fn save(
    outputs: &mut Vec<OutputFile>,
    image: &RgbImage,
    path: PathBuf,
    settings: &JpegSettings,
) -> anyhow::Result<()> {
    let bytes = encode::save_rgb(image, &path, settings)?;
    outputs.push(OutputFile {
        path,
        width: image.width(),
        height: image.height(),
        bytes,
    });
    Ok(())
}

pub fn run(config: &BenchConfig) -> anyhow::Result<BenchReport> {
    let layout = &config.layout;
    let jpeg = &config.jpeg;
    let out = &config.output_dir;

    // Checked before any output is written.
    layout.check_splittable()?;

    let mut timer = PhaseTimer::new();
    let mut outputs = Vec::new();

    let frame = timer.time("read", || RawFrame::load(&config.input))?;
    log::info!(
        "input {} ({} bytes), {}x{} {:?}",
        config.input.display(),
        frame.len(),
        layout.width,
        layout.height,
        layout.order
    );

    // Library path: decode, convert, whole-frame encode, crop.
    let bytes = frame.clone();
    let packed = timer.time("decode", || pixels::decode_packed(bytes, layout))?;
    let rgb = timer.time("convert", || pixels::packed_to_rgb(&packed, layout.order));
    drop(packed);

    timer.time("encode full", || {
        save(&mut outputs, &rgb, out.join(format!("{}.jpg", layout.width)), jpeg)
    })?;

    let cropped = timer.time("crop", || quadrants::crop_quadrants(&rgb));
    timer.time("encode crop tiles", || {
        for (quadrant, tile) in Quadrant::ALL.iter().zip(&cropped) {
            let path = out.join(format!("crop_{}.jpg", quadrant.number()));
            save(&mut outputs, tile, path, jpeg)?;
        }
        anyhow::Ok(())
    })?;

    // Array path: reshape, slice off alpha, split, encode.
    let bytes = frame.clone();
    let array = timer.time("reshape", || pixels::reshape_packed(bytes, layout))?;
    let array = timer.time("slice alpha", || pixels::drop_alpha(&array, layout.order));
    let sliced = timer.time("split", || quadrants::slice_quadrants(&array));
    let sliced_tiles = timer.time("encode slice tiles", || {
        let mut tiles = Vec::with_capacity(4);
        for (quadrant, view) in Quadrant::ALL.iter().zip(sliced) {
            let tile = pixels::array_to_rgb(view)?;
            let path = out.join(format!("{}.jpg", quadrant.short_name()));
            save(&mut outputs, &tile, path, jpeg)?;
            tiles.push(tile);
        }
        anyhow::Ok(tiles)
    })?;

    if config.direct {
        let bytes = timer.time("encode direct", || encode::encode_packed(&frame, layout, jpeg))?;
        let path = out.join(format!("{}_direct.jpg", layout.width));
        encode::write_jpeg(&path, &bytes)?;
        outputs.push(OutputFile {
            path,
            width: layout.width,
            height: layout.height,
            bytes: bytes.len(),
        });
    }

    let mut qoi_round_trip = None;
    if config.qoi {
        let bytes = timer.time("encode qoi", || encode::encode_qoi(&rgb))?;
        let path = out.join(format!("{}.qoi", layout.width));
        std::fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("qoi size: {} bytes", bytes.len());

        let decoded = timer.time("decode qoi", || encode::decode_qoi(&bytes))?;
        qoi_round_trip = Some(decoded == rgb);

        outputs.push(OutputFile {
            path,
            width: layout.width,
            height: layout.height,
            bytes: bytes.len(),
        });
    }

    let verification = if config.verify {
        let mut verification = verify(&rgb, &array, &cropped, &sliced_tiles)?;
        verification.qoi_round_trip = qoi_round_trip;
        if qoi_round_trip == Some(false) {
            log::warn!("qoi output does not decode back to the source image");
        }
        Some(verification)
    } else {
        None
    };

    Ok(BenchReport {
        timer,
        outputs,
        verification,
    })
}

fn verify(
    rgb: &RgbImage,
    array: &ndarray::Array3<u8>,
    cropped: &[RgbImage; 4],
    sliced: &[RgbImage],
) -> anyhow::Result<Verification> {
    let conversions_match = pixels::array_to_rgb(array.view())? == *rgb;
    if !conversions_match {
        log::warn!("image and array conversions differ");
    }

    let mut tiles_match = cropped.len() == sliced.len();
    for ((quadrant, crop), slice) in Quadrant::ALL.iter().zip(cropped).zip(sliced) {
        if crop != slice {
            log::warn!("{:?} crop and slice tiles differ", quadrant);
            tiles_match = false;
        }
    }

    let reassembles = quadrants::assemble_quadrants(cropped, rgb.width(), rgb.height())? == *rgb;
    if !reassembles {
        log::warn!("crop tiles do not reassemble the source image");
    }

    let verification = Verification {
        conversions_match,
        tiles_match,
        reassembles,
        qoi_round_trip: None,
    };
    if verification.all_ok() {
        log::info!("both paths produced identical pixels");
    }

    Ok(verification)
}
