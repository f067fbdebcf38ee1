//! Session settings, filled from the command line.

use std::f64::consts::PI;

use clap::Args;

use crate::view::{DEFAULT_CAMERA_Z, DEFAULT_EXTENT, DEFAULT_HANDLE_TOLERANCE};

/// Radians of view rotation per unit of raw pointer delta.
pub const DEFAULT_SENSITIVITY: f64 = 0.01;
pub const DEFAULT_TICK_MS: u64 = 16;

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Initial polar angle, in multiples of pi
    #[arg(long, default_value_t = 0.25, allow_negative_numbers = true)]
    pub theta: f64,

    /// Initial azimuth, in multiples of pi
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub phi: f64,

    /// View rotation per unit of pointer movement while dragging the background
    #[arg(long, default_value_t = DEFAULT_SENSITIVITY, allow_negative_numbers = true, value_parser = parse_sensitivity)]
    pub sensitivity: f64,

    /// Half of the visible height in sphere radii
    #[arg(long, default_value_t = DEFAULT_EXTENT, value_parser = parse_extent)]
    pub extent: f64,

    /// Camera distance from the sphere center
    #[arg(long, default_value_t = DEFAULT_CAMERA_Z, value_parser = parse_camera_z)]
    pub camera_z: f64,

    /// Pick radius around the state vector, in normalized screen units
    #[arg(long, default_value_t = DEFAULT_HANDLE_TOLERANCE, value_parser = parse_handle_tolerance)]
    pub handle_tolerance: f64,

    /// Milliseconds between dispatcher drains
    #[arg(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theta: 0.25,
            phi: 0.5,
            sensitivity: DEFAULT_SENSITIVITY,
            extent: DEFAULT_EXTENT,
            camera_z: DEFAULT_CAMERA_Z,
            handle_tolerance: DEFAULT_HANDLE_TOLERANCE,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

fn parse_in_range(value: &str, min: f64, max: f64) -> Result<f64, String> {
    let parsed: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("{parsed} is not within {min}..={max}"))
    }
}

fn parse_sensitivity(value: &str) -> Result<f64, String> {
    parse_in_range(value, -1.0, 1.0)
}

fn parse_extent(value: &str) -> Result<f64, String> {
    parse_in_range(value, 0.1, 100.0)
}

// the camera has to sit outside the unit sphere
fn parse_camera_z(value: &str) -> Result<f64, String> {
    parse_in_range(value, 1.01, 1000.0)
}

fn parse_handle_tolerance(value: &str) -> Result<f64, String> {
    parse_in_range(value, 1e-3, 1.0)
}

impl Settings {
    /// Initial `(theta, phi)` in radians.
    pub fn initial_angles(&self) -> (f64, f64) {
        (self.theta * PI, self.phi * PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Harness::parse_from(["bloch"]);
        assert_eq!(parsed.settings, Settings::default());
    }

    #[test]
    fn test_angles_are_in_units_of_pi() {
        let parsed = Harness::parse_from(["bloch", "--theta", "1", "--phi", "-0.5"]);
        let (theta, phi) = parsed.settings.initial_angles();
        assert!((theta - PI).abs() < 1e-12);
        assert!((phi + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_view_settings_out_of_range_are_rejected() {
        for args in [
            ["bloch", "--extent", "1e-10"],
            ["bloch", "--extent", "inf"],
            ["bloch", "--camera-z", "0.5"],
            ["bloch", "--handle-tolerance", "0"],
            ["bloch", "--sensitivity", "NaN"],
            ["bloch", "--tick-ms", "0"],
        ] {
            assert!(Harness::try_parse_from(args).is_err(), "{args:?} was accepted");
        }

        let parsed = Harness::parse_from(["bloch", "--extent", "3", "--camera-z", "5"]);
        assert_eq!(parsed.settings.extent, 3.0);
        assert_eq!(parsed.settings.camera_z, 5.0);
    }
}
