//! Procedural audio
//!
//! Engine drone, a background music loop and a crash burst, all synthesized.
//! The numbers live here as pure functions; `web` plays them through the
//! Web Audio API.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

/// Master output level
pub const MASTER_GAIN: f32 = 0.12;
/// Crash burst length and level
pub const CRASH_SECS: f32 = 0.4;
pub const CRASH_GAIN: f32 = 0.2;
/// Smoothing time constant for engine parameter changes (seconds)
pub const ENGINE_GLIDE_SECS: f64 = 0.08;

/// Continuous voice parameters for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioParams {
    /// Engine oscillator pitch (Hz)
    pub engine_freq: f32,
    /// Low-pass cutoff on the engine (Hz)
    pub engine_cutoff: f32,
    pub engine_gain: f32,
    /// Lead melody pitch (Hz)
    pub music_freq: f32,
}

impl AudioParams {
    /// Map the engine ratio (speed / target speed) and run time to voice settings
    pub fn compute(ratio: f32, running: bool, time: f32) -> Self {
        Self {
            engine_freq: 70.0 + ratio * 140.0,
            engine_cutoff: 280.0 + ratio * 260.0,
            engine_gain: if running { 0.035 + ratio * 0.015 } else { 0.008 },
            music_freq: 220.0 + (time * 0.5).sin() * 30.0,
        }
    }
}

/// MIDI note number to frequency (A4 = 69 = 440 Hz)
pub fn midi_to_freq(note: i32) -> f32 {
    440.0 * 2f32.powf((note - 69) as f32 / 12.0)
}

/// Minor pentatonic intervals
const SCALE: [i32; 5] = [0, 3, 5, 7, 10];
/// One chord root per bar
const CHORD_ROOTS: [i32; 4] = [48, 43, 50, 45];
/// Scale degrees walked by the arpeggio within a bar
const ARP_PATTERN: [usize; 8] = [0, 2, 4, 2, 0, 3, 4, 3];
const BPM: f32 = 80.0;

/// Seconds per sequencer step (eighth notes)
pub const STEP_SECS: f32 = 60.0 / BPM / 2.0;

/// Notes (Hz) for one sequencer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerStep {
    pub arp: f32,
    pub bass: f32,
    pub pad: f32,
}

/// Step sequencer for the music loop, driven by frame deltas
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    step: usize,
    elapsed: f32,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes for a given absolute step index
    pub fn notes_at(step: usize) -> SequencerStep {
        let bar = step / ARP_PATTERN.len();
        let root = CHORD_ROOTS[bar % CHORD_ROOTS.len()];
        let degree = ARP_PATTERN[step % ARP_PATTERN.len()];
        SequencerStep {
            arp: midi_to_freq(root + SCALE[degree]),
            bass: midi_to_freq(root - 12),
            pad: midi_to_freq(root),
        }
    }

    /// Advance by `dt` seconds. Returns the latest step that fired, if any.
    pub fn advance(&mut self, dt: f32) -> Option<SequencerStep> {
        self.elapsed += dt.max(0.0);
        let mut fired = None;
        while self.elapsed >= STEP_SECS {
            self.elapsed -= STEP_SECS;
            fired = Some(Self::notes_at(self.step));
            self.step += 1;
        }
        fired
    }
}

/// Linearly fading white noise, `len` samples. `noise` yields values in [0, 1).
pub fn crash_samples(len: usize, mut noise: impl FnMut() -> f32) -> Vec<f32> {
    (0..len)
        .map(|i| (noise() * 2.0 - 1.0) * (1.0 - i as f32 / len as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_engine_params_running() {
        let p = AudioParams::compute(1.0, true, 0.0);
        assert!(close(p.engine_freq, 210.0));
        assert!(close(p.engine_cutoff, 540.0));
        assert!(close(p.engine_gain, 0.05));
        assert!(close(p.music_freq, 220.0));
    }

    #[test]
    fn test_engine_idles_when_stopped() {
        let p = AudioParams::compute(1.5, false, 3.0);
        assert!(close(p.engine_gain, 0.008));
        // Pitch still follows the ratio
        assert!(close(p.engine_freq, 280.0));
    }

    #[test]
    fn test_music_wobble_range() {
        for i in 0..200 {
            let f = AudioParams::compute(0.0, true, i as f32 * 0.37).music_freq;
            assert!((190.0..=250.0).contains(&f));
        }
    }

    #[test]
    fn test_midi_to_freq() {
        assert!(close(midi_to_freq(69), 440.0));
        assert!(close(midi_to_freq(57), 220.0));
        assert!(close(midi_to_freq(48), 130.813));
    }

    #[test]
    fn test_sequencer_first_bar() {
        let first = Sequencer::notes_at(0);
        assert!(close(first.pad, midi_to_freq(48)));
        assert!(close(first.bass, midi_to_freq(36)));
        assert!(close(first.arp, midi_to_freq(48)));
        // Step 1 plays scale degree 2, a fourth above the root
        assert!(close(Sequencer::notes_at(1).arp, midi_to_freq(53)));
        // Bar 2 moves to the second chord root
        assert!(close(Sequencer::notes_at(8).pad, midi_to_freq(43)));
        // Loop wraps after four bars
        assert_eq!(Sequencer::notes_at(32), Sequencer::notes_at(0));
    }

    #[test]
    fn test_sequencer_timing() {
        let mut seq = Sequencer::new();
        assert_eq!(seq.advance(STEP_SECS * 0.5), None);
        assert_eq!(seq.advance(STEP_SECS * 0.6), Some(Sequencer::notes_at(0)));
        assert_eq!(seq.step, 1);
        // A long frame catches up and reports only the latest step
        assert_eq!(seq.advance(STEP_SECS * 3.0), Some(Sequencer::notes_at(3)));
        assert_eq!(seq.step, 4);
    }

    #[test]
    fn test_crash_fades_out() {
        let samples = crash_samples(100, || 1.0);
        assert_eq!(samples.len(), 100);
        assert!(close(samples[0], 1.0));
        assert!(samples.windows(2).all(|w| w[1] <= w[0]));
        assert!(samples[99] < 0.02);
    }
}
