//! Whole-frame JPEG encoding over a directory of raw frames named
//! `index_width_height.ext`, optionally spread over a thread pool and
//! followed by an LZ4 pass over each encoded file.

use crate::encode::{self, JpegSettings};
use crate::frame::{FrameLayout, PixelOrder, RawFrame};
use crate::timing::millis;
use anyhow::Context;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub jpeg: JpegSettings,
    pub order: PixelOrder,
    pub threads: usize,
    /// LZ4-compress each encoded JPEG and time that too.
    pub lz4: bool,
}

/// Frame metadata parsed from a file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameName {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameName {
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split(|c: char| c == '_' || c == '.').collect();
        if parts.len() != 4 {
            return None;
        }

        Some(Self {
            index: parts[0].parse().ok()?,
            width: parts[1].parse().ok()?,
            height: parts[2].parse().ok()?,
        })
    }
}

#[derive(Debug)]
pub struct Job {
    pub name: String,
    pub frame_name: FrameName,
    pub frame: RawFrame,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct JobResult {
    pub name: String,
    pub source_len: usize,
    pub outcome: anyhow::Result<Encoded>,
}

#[derive(Clone, Copy, Debug)]
pub struct Encoded {
    pub encode_time: Duration,
    pub encoded_len: usize,
    pub compressed: Option<Compressed>,
}

#[derive(Clone, Copy, Debug)]
pub struct Compressed {
    pub compress_time: Duration,
    pub compressed_len: usize,
}

impl Encoded {
    pub fn ratio(&self, source_len: usize) -> f64 {
        self.encoded_len as f64 / source_len as f64
    }

    pub fn total_time(&self) -> Duration {
        self.encode_time + self.compressed.map_or(Duration::ZERO, |c| c.compress_time)
    }
}

/// LZ4 block compression of an encoded frame.
pub fn compress_lz4(bytes: &[u8]) -> (Vec<u8>, Duration) {
    let start = Instant::now();
    let compressed = lz4_flex::block::compress(bytes);
    (compressed, start.elapsed())
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(encoded) => {
                write!(
                    f,
                    "encode time: {:.3}ms\tencode size: {:.2}kb\tencode ratio: {:.4}\t",
                    millis(encoded.encode_time),
                    encoded.encoded_len as f64 / 1024.0,
                    encoded.ratio(self.source_len),
                )?;
                if let Some(compressed) = encoded.compressed {
                    write!(
                        f,
                        "compress time: {:.3}ms\tcompress size: {:.2}kb\tcompress ratio: {:.4}\t",
                        millis(compressed.compress_time),
                        compressed.compressed_len as f64 / 1024.0,
                        compressed.compressed_len as f64 / self.source_len as f64,
                    )?;
                }
                write!(f, "{}", self.name)
            }
            Err(err) => write!(f, "failed: {:#}\t{}", err, self.name),
        }
    }
}

#[derive(Debug)]
pub struct BatchSummary {
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &Encoded> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().ok())
    }

    fn average(&self, time: impl Fn(&Encoded) -> Option<Duration>) -> Option<Duration> {
        let times: Vec<Duration> = self.succeeded().filter_map(time).collect();
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<Duration>() / times.len() as u32)
    }

    pub fn average_encode_time(&self) -> Option<Duration> {
        self.average(|e| Some(e.encode_time))
    }

    /// `None` unless at least one frame was compressed.
    pub fn average_compress_time(&self) -> Option<Duration> {
        self.average(|e| e.compressed.map(|c| c.compress_time))
    }

    pub fn average_total_time(&self) -> Option<Duration> {
        self.average(|e| Some(e.total_time()))
    }
}

/// Read every well-named frame in `config.input_dir`, in file name order.
/// Badly named or unreadable files are skipped with a warning.
pub fn collect_jobs(config: &BatchConfig) -> anyhow::Result<Vec<Job>> {
    anyhow::ensure!(
        config.input_dir.is_dir(),
        "input directory {} does not exist",
        config.input_dir.display()
    );

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&config.input_dir)
        .with_context(|| format!("failed to list {}", config.input_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut jobs = Vec::new();
    for path in paths {
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_owned(),
            None => continue,
        };

        let frame_name = match FrameName::parse(&name) {
            Some(frame_name) => frame_name,
            None => {
                log::warn!("invalid file name: {}", name);
                continue;
            }
        };

        let frame = match RawFrame::load(&path) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("{}", err);
                continue;
            }
        };

        log::info!(
            "index: {}, width: {}, height: {}, name: {}, size: {}",
            frame_name.index,
            frame_name.width,
            frame_name.height,
            name,
            frame.len()
        );

        let output = config
            .output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.jpg", name)));

        jobs.push(Job {
            name,
            frame_name,
            frame,
            output,
        });
    }

    Ok(jobs)
}

fn encode_job(job: &Job, config: &BatchConfig) -> JobResult {
    let layout = FrameLayout::new(job.frame_name.width, job.frame_name.height, config.order);

    let outcome = (|| -> anyhow::Result<Encoded> {
        let start = Instant::now();
        let bytes = encode::encode_packed(&job.frame, &layout, &config.jpeg)?;
        let encode_time = start.elapsed();

        let compressed = config.lz4.then(|| {
            let (lz4, compress_time) = compress_lz4(&bytes);
            Compressed {
                compress_time,
                compressed_len: lz4.len(),
            }
        });

        if let Some(output) = &job.output {
            encode::write_jpeg(output, &bytes)?;
        }

        Ok(Encoded {
            encode_time,
            encoded_len: bytes.len(),
            compressed,
        })
    })();

    if let Err(err) = &outcome {
        log::warn!("failed to encode {}: {:#}", job.name, err);
    }

    JobResult {
        name: job.name.clone(),
        source_len: job.frame.len(),
        outcome,
    }
}

pub fn encode_all(jobs: &[Job], config: &BatchConfig) -> anyhow::Result<BatchSummary> {
    let results: Vec<JobResult> = if config.threads <= 1 {
        jobs.iter()
            .map(|job| encode_job(job, config))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        log::info!("encoding {} frames on {} threads", jobs.len(), config.threads);
        pool.install(|| {
            jobs.par_iter()
                .map(|job| encode_job(job, config))
                .collect()
        })
    };

    Ok(BatchSummary { results })
}

pub fn run(config: &BatchConfig) -> anyhow::Result<BatchSummary> {
    if let Some(dir) = &config.output_dir {
        ensure_dir(dir)?;
    }

    let jobs = collect_jobs(config)?;
    encode_all(&jobs, config)
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_index_width_height() {
        assert_eq!(
            FrameName::parse("0_1920_1080.rgb"),
            Some(FrameName {
                index: 0,
                width: 1920,
                height: 1080
            })
        );
        assert_eq!(FrameName::parse("12_3840_2160.bgra").unwrap().index, 12);
    }

    #[test]
    fn rejects_other_names() {
        assert_eq!(FrameName::parse("1920.bgra"), None);
        assert_eq!(FrameName::parse("a_1920_1080.rgb"), None);
        assert_eq!(FrameName::parse("0_1920_1080_x.rgb"), None);
        assert_eq!(FrameName::parse("0_1920_1080.tar.gz"), None);
    }

    #[test]
    fn average_skips_failures() {
        let ok = |ms| JobResult {
            name: String::new(),
            source_len: 100,
            outcome: Ok(Encoded {
                encode_time: Duration::from_millis(ms),
                encoded_len: 10,
                compressed: None,
            }),
        };
        let summary = BatchSummary {
            results: vec![
                ok(2),
                JobResult {
                    name: "bad".into(),
                    source_len: 1,
                    outcome: Err(anyhow::anyhow!("boom")),
                },
                ok(4),
            ],
        };

        assert_eq!(summary.average_encode_time(), Some(Duration::from_millis(3)));
        assert_eq!(summary.average_total_time(), Some(Duration::from_millis(3)));
        assert_eq!(summary.average_compress_time(), None);
        assert_eq!(summary.succeeded().count(), 2);
        assert!(summary.results[1].to_string().starts_with("failed: boom"));
    }

    #[test]
    fn ratio_is_encoded_over_source() {
        let encoded = Encoded {
            encode_time: Duration::ZERO,
            encoded_len: 25,
            compressed: None,
        };
        assert_eq!(encoded.ratio(100), 0.25);
    }

    #[test]
    fn total_time_adds_compression() {
        let encoded = Encoded {
            encode_time: Duration::from_millis(5),
            encoded_len: 40,
            compressed: Some(Compressed {
                compress_time: Duration::from_millis(2),
                compressed_len: 30,
            }),
        };
        let result = JobResult {
            name: "0_8_8.rgb".into(),
            source_len: 100,
            outcome: Ok(encoded),
        };

        assert_eq!(encoded.total_time(), Duration::from_millis(7));
        let line = result.to_string();
        assert!(line.contains("compress ratio: 0.3000"), "{}", line);
        assert!(line.ends_with("0_8_8.rgb"), "{}", line);
    }

    #[test]
    fn lz4_output_decompresses_to_input() {
        let input: Vec<u8> = (0..4096u32).map(|i| (i % 61) as u8).collect();
        let (compressed, _) = compress_lz4(&input);

        assert!(compressed.len() < input.len());
        assert_eq!(lz4_flex::block::decompress(&compressed, input.len()).unwrap(), input);
    }
}
