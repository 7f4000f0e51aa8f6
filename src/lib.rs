pub mod batch;
pub mod bench;
pub mod encode;
pub mod frame;
pub mod pixels;
pub mod quadrants;
pub mod timing;

pub use frame::{FrameError, FrameLayout, PixelOrder, RawFrame};

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
