use std::path::PathBuf;

/// BGRA frame with smooth gradients and a distinct colour per quadrant, so
/// misplaced tiles show up in pixel comparisons.
pub fn gradient_bgra(width: u32, height: u32) -> Vec<u8> {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");

    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            let b = if (x < width / 2) == (y < height / 2) { 64 } else { 192 };
            bytes.extend_from_slice(&[b, g, r, 0xff]);
        }
    }
    bytes
}

/// Fresh, empty scratch directory for one test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frame-bench-{}-{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("clear scratch dir");
    }
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub fn mean_abs_error(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x as i16 - y as i16).unsigned_abs() as u64)
        .sum();
    total as f64 / a.len() as f64
}
