//! Frame clock
//!
//! Turns `requestAnimationFrame` timestamps into clamped simulation deltas.

use crate::consts::MAX_FRAME_DT;

/// Clamp a raw frame delta (seconds) into `[0, MAX_FRAME_DT]`
pub fn clamp_frame_delta(secs: f64) -> f32 {
    if !secs.is_finite() {
        return 0.0;
    }
    (secs as f32).clamp(0.0, MAX_FRAME_DT)
}

/// Tracks the previous frame timestamp
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous call, in seconds. The first frame yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => clamp_frame_delta((now_ms - last) / 1000.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the previous timestamp (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(12_345.0), 0.0);
    }

    #[test]
    fn test_normal_frame() {
        let mut clock = FrameClock::new();
        clock.advance(1000.0);
        let dt = clock.advance(1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_background_gap_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(1000.0);
        assert_eq!(clock.advance(61_000.0), MAX_FRAME_DT);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = FrameClock::new();
        clock.advance(5000.0);
        assert_eq!(clock.advance(4000.0), 0.0);
    }

    #[test]
    fn test_reset_skips_gap() {
        let mut clock = FrameClock::new();
        clock.advance(1000.0);
        clock.reset();
        assert_eq!(clock.advance(90_000.0), 0.0);
    }

    #[test]
    fn test_clamp_non_finite() {
        assert_eq!(clamp_frame_delta(f64::NAN), 0.0);
        assert_eq!(clamp_frame_delta(f64::INFINITY), 0.0);
    }
}
