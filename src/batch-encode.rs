use frame_bench::batch::{self, BatchConfig};
use frame_bench::encode::{JpegSettings, Subsampling};
use frame_bench::timing::millis;
use frame_bench::PixelOrder;
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct Opts {
    /// Directory of raw frames named index_width_height.ext
    #[structopt(short, long)]
    input: std::path::PathBuf,
    /// Write <name>.jpg files here. Nothing is written without it.
    #[structopt(short, long)]
    output: Option<std::path::PathBuf>,
    #[structopt(short, long, default_value = "100")]
    quality: u8,
    #[structopt(long, default_value = "4:2:0")]
    subsampling: Subsampling,
    #[structopt(long, default_value = "bgra")]
    order: PixelOrder,
    #[structopt(short, long, default_value = "1")]
    threads: usize,
    /// LZ4-compress each encoded frame and report it.
    #[structopt(long)]
    lz4: bool,
}

fn main() -> anyhow::Result<()> {
    frame_bench::init_logging();

    let opts = Opts::from_args();

    let max_threads = std::thread::available_parallelism().map_or(1, |n| n.get()) * 4;
    anyhow::ensure!(
        (1..=max_threads).contains(&opts.threads),
        "threads must be within 1..={}",
        max_threads
    );

    let config = BatchConfig {
        input_dir: opts.input,
        output_dir: opts.output,
        jpeg: JpegSettings::new(opts.quality, opts.subsampling)?,
        order: opts.order,
        threads: opts.threads,
        lz4: opts.lz4,
    };

    log::info!(
        "threads: {}, quality: {}, subsampling: {:?}",
        config.threads,
        config.jpeg.quality,
        config.jpeg.subsampling
    );

    let summary = batch::run(&config)?;

    for result in &summary.results {
        println!("{}", result);
    }

    match summary.average_encode_time() {
        Some(average) => println!("Average encode time: {:.3}ms", millis(average)),
        None => println!("No frames encoded"),
    }
    if let Some(average) = summary.average_compress_time() {
        println!("Average compress time: {:.3}ms", millis(average));
    }
    if let Some(average) = summary.average_total_time() {
        println!("Average total time: {:.3}ms", millis(average));
    }

    Ok(())
}
