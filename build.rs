//! Build script for detecting system dependencies and providing installation guidance.
//!
//! The core library has no system dependencies. When the `app` feature is
//! enabled this script checks for OpenCV and pkg-config and prints helpful
//! messages if they are missing.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // OpenCV is only needed for the capture/rendering application.
    if env::var("CARGO_FEATURE_APP").is_ok() {
        check_pkg_config();
        check_opencv();
    }

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    for pkg in ["opencv4", "opencv"] {
        let output = Command::new("pkg-config").args(["--modversion", pkg]).output();
        if let Ok(output) = output {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout);
                println!("cargo:warning=Found OpenCV version: {}", version.trim());
                return;
            }
        }
    }

    println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
    println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
    println!("cargo:warning=On macOS: brew install opencv");
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {}
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}
