// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use kinect_viewer::constants::*;
use kinect_viewer::pipeline::FrameGeometry;
use kinect_viewer::render::DisplayMode;

#[test]
fn test_kinect_v2_grid_sizes() {
    assert_eq!(DEPTH_PIXEL_COUNT, 512 * 424);
    assert_eq!(COLOR_PIXEL_COUNT, 1920 * 1080);
    assert_eq!(FrameGeometry::KINECT_V2.depth_pixel_count(), DEPTH_PIXEL_COUNT);
    assert_eq!(FrameGeometry::KINECT_V2.color_pixel_count(), COLOR_PIXEL_COUNT);
}

#[test]
fn test_infrared_output_range_is_ordered() {
    // Lower clamp must stay below the upper clamp and inside 0..=1
    assert!(INFRARED_OUTPUT_VALUE_MINIMUM < INFRARED_OUTPUT_VALUE_MAXIMUM);
    assert!(INFRARED_OUTPUT_VALUE_MINIMUM >= 0.0);
    assert!(INFRARED_OUTPUT_VALUE_MAXIMUM <= 1.0);
}

#[test]
fn test_display_mode_keys_are_unique() {
    // Every mode has its own key, '1' through '6'
    let keys: Vec<char> = DisplayMode::ALL.iter().map(|m| m.key()).collect();
    assert_eq!(keys, vec!['1', '2', '3', '4', '5', '6']);
}

#[test]
fn test_display_mode_names() {
    // Test that all modes have non-empty display names
    for mode in DisplayMode::ALL {
        let name = mode.display_name();
        assert!(!name.is_empty(), "Mode {:?} has empty display name", mode);
    }
}
