mod common;

use common::synthetic_frame::scratch_dir;
use frame_bench::bench::enter_workdir;

// Changes the process's current directory, so it lives in its own test binary.
#[test]
fn enters_requested_directory() {
    let dir = scratch_dir("workdir");

    let cwd = enter_workdir(Some(&dir)).expect("enter workdir");

    assert_eq!(cwd, dir.canonicalize().unwrap());
    assert_eq!(std::env::current_dir().unwrap(), cwd);
    assert!(enter_workdir(Some(&dir.join("absent"))).is_err());
}
