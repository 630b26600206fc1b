// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use kinect_viewer::Config;
use kinect_viewer::errors::ConfigError;
use kinect_viewer::pipeline::InfraredPolicy;
use kinect_viewer::render::DisplayMode;
use kinect_viewer::sensor::ColorImageFormat;
use std::path::PathBuf;

fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "kinect-viewer-{}-{}.json",
        name,
        std::process::id()
    ))
}

#[test]
fn test_config_default() {
    // Test that default config can be created
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(config.initial_mode, DisplayMode::Color);
    assert_eq!(config.infrared.policy, InfraredPolicy::Normalized);
    assert!(!config.orbit.enabled, "Orbit camera should be off by default");
    assert_eq!(config.sensor.tracked_body_slot, Some(2));
    assert_eq!(config.sensor.color_format, ColorImageFormat::Yuy2);
}

#[test]
fn test_config_load_from_file() {
    let path = temp_config_path("load");
    std::fs::write(
        &path,
        r#"{
            "initial_mode": "PointCloud",
            "orbit": { "enabled": true },
            "infrared": { "policy": "RawLowByte" }
        }"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.initial_mode, DisplayMode::PointCloud);
    assert!(config.orbit.enabled);
    assert_eq!(config.orbit.radius, 3.0);
    assert_eq!(config.infrared.policy, InfraredPolicy::RawLowByte);
}

#[test]
fn test_config_missing_explicit_file_is_an_error() {
    let path = temp_config_path("missing");
    let result = Config::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Read(_))));
}

#[test]
fn test_config_malformed_json_is_a_parse_error() {
    let result = Config::from_json("{ initial_mode: ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_invalid_values_rejected_on_load() {
    let path = temp_config_path("invalid");
    std::fs::write(&path, r#"{ "sensor": { "color_divisor": 0 } }"#).unwrap();

    let result = Config::load(Some(&path));
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_default_path_location() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("kinect-viewer/config.json"));
    }
}
