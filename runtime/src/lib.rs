//! Capture host: recognises faces from a camera and drives the display.

pub mod config;
pub mod digest;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod session;

/// Determine the loop delay in seconds from CLI or `FACEBIT_INTERVAL` env.
/// Falls back to `1.0` if unset, or not a delay a `Duration` can hold.
pub fn tick_rate(cli: Option<f32>) -> f32 {
    cli.or_else(|| std::env::var("FACEBIT_INTERVAL").ok()?.parse::<f32>().ok())
        .filter(|secs| std::time::Duration::try_from_secs_f32(*secs).is_ok())
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // One test so the env var is not raced by parallel tests.
    #[test]
    fn interval_sources() {
        env::set_var("FACEBIT_INTERVAL", "2.0");
        assert_eq!(tick_rate(Some(0.5)), 0.5);
        assert_eq!(tick_rate(None), 2.0);

        env::set_var("FACEBIT_INTERVAL", "soon");
        assert_eq!(tick_rate(None), 1.0);

        env::remove_var("FACEBIT_INTERVAL");
        assert_eq!(tick_rate(None), 1.0);
        assert_eq!(tick_rate(Some(-3.0)), 1.0);
        assert_eq!(tick_rate(Some(f32::NAN)), 1.0);
        assert_eq!(tick_rate(Some(1e20)), 1.0);

        env::set_var("FACEBIT_INTERVAL", "1e20");
        assert_eq!(tick_rate(None), 1.0);
        env::remove_var("FACEBIT_INTERVAL");
    }
}
