use frame_bench::bench::{self, BenchConfig};
use frame_bench::encode::{JpegSettings, Subsampling};
use frame_bench::{FrameLayout, PixelOrder};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct Opts {
    /// Raw frame, width * height * 4 bytes with no header.
    #[structopt(default_value = "1920.bgra")]
    input: std::path::PathBuf,
    #[structopt(long, default_value = "1920")]
    width: u32,
    #[structopt(long, default_value = "1080")]
    height: u32,
    /// Channel order of the input: bgra or rgba.
    #[structopt(long, default_value = "bgra")]
    order: PixelOrder,
    #[structopt(long, default_value = "100")]
    quality: u8,
    /// 4:4:4, 4:2:2 or 4:2:0.
    #[structopt(long, default_value = "4:2:0")]
    subsampling: Subsampling,
    /// Directory to run in. Defaults to the one holding this executable.
    #[structopt(long)]
    workdir: Option<std::path::PathBuf>,
    #[structopt(long, default_value = ".")]
    output_dir: std::path::PathBuf,
    /// Also time encoding the 4-channel frame directly.
    #[structopt(long)]
    direct: bool,
    /// Also time a lossless QOI encode and decode, written to <width>.qoi.
    #[structopt(long)]
    qoi: bool,
    /// Check that both paths produce identical pixels.
    #[structopt(long)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    frame_bench::init_logging();

    let opts = Opts::from_args();

    bench::enter_workdir(opts.workdir.as_deref())?;

    let config = BenchConfig {
        input: opts.input,
        output_dir: opts.output_dir,
        layout: FrameLayout::new(opts.width, opts.height, opts.order),
        jpeg: JpegSettings::new(opts.quality, opts.subsampling)?,
        direct: opts.direct,
        qoi: opts.qoi,
        verify: opts.verify,
    };

    let report = bench::run(&config)?;

    println!("{}", report.timer);
    println!();
    for output in &report.outputs {
        println!(
            "{}\t{}x{}\t{:.2}kb",
            output.path.display(),
            output.width,
            output.height,
            output.bytes as f64 / 1024.0
        );
    }

    if let Some(verification) = report.verification {
        println!();
        println!("{:?}", verification);
    }

    Ok(())
}
