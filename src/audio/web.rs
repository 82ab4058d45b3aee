//! Web Audio playback
//!
//! One long-lived oscillator graph (engine, lead, pad, bass, arpeggio) fed
//! into a master gain. Parameter changes are scheduled on the audio clock.

use web_sys::{
    AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType, GainNode, OscillatorNode,
    OscillatorType,
};

use super::{
    AudioParams, CRASH_GAIN, CRASH_SECS, ENGINE_GLIDE_SECS, MASTER_GAIN, Sequencer, crash_samples,
};

/// Nodes that live for the whole session
struct AudioGraph {
    ctx: AudioContext,
    master: GainNode,
    engine_osc: OscillatorNode,
    engine_filter: BiquadFilterNode,
    engine_gain: GainNode,
    music_osc: OscillatorNode,
    pad_osc: OscillatorNode,
    bass_osc: OscillatorNode,
    arp_osc: OscillatorNode,
}

impl AudioGraph {
    fn build() -> Option<Self> {
        let ctx = AudioContext::new().ok()?;

        let master = ctx.create_gain().ok()?;
        master.gain().set_value(MASTER_GAIN);
        master.connect_with_audio_node(&ctx.destination()).ok()?;

        // Engine: triangle through a low-pass
        let engine_osc = ctx.create_oscillator().ok()?;
        engine_osc.set_type(OscillatorType::Triangle);
        let engine_filter = ctx.create_biquad_filter().ok()?;
        engine_filter.set_type(BiquadFilterType::Lowpass);
        engine_filter.frequency().set_value(420.0);
        engine_filter.q().set_value(0.7);
        let engine_gain = ctx.create_gain().ok()?;
        engine_gain.gain().set_value(0.0);
        engine_osc.connect_with_audio_node(&engine_filter).ok()?;
        engine_filter.connect_with_audio_node(&engine_gain).ok()?;
        engine_gain.connect_with_audio_node(&master).ok()?;

        let music_osc = Self::voice(&ctx, &master, OscillatorType::Triangle, 220.0, 0.03)?;
        let pad_osc = Self::voice(&ctx, &master, OscillatorType::Sawtooth, 130.81, 0.02)?;
        let bass_osc = Self::voice(&ctx, &master, OscillatorType::Square, 65.41, 0.02)?;
        let arp_osc = Self::voice(&ctx, &master, OscillatorType::Triangle, 261.63, 0.015)?;

        // Slow vibrato on the pad
        let lfo = ctx.create_oscillator().ok()?;
        lfo.set_type(OscillatorType::Sine);
        lfo.frequency().set_value(0.25);
        let lfo_gain = ctx.create_gain().ok()?;
        lfo_gain.gain().set_value(8.0);
        lfo.connect_with_audio_node(&lfo_gain).ok()?;
        lfo_gain.connect_with_audio_param(&pad_osc.frequency()).ok()?;

        for osc in [&engine_osc, &music_osc, &pad_osc, &bass_osc, &arp_osc, &lfo] {
            osc.start().ok()?;
        }

        Some(Self {
            ctx,
            master,
            engine_osc,
            engine_filter,
            engine_gain,
            music_osc,
            pad_osc,
            bass_osc,
            arp_osc,
        })
    }

    /// Oscillator at a fixed level into the master bus
    fn voice(
        ctx: &AudioContext,
        master: &GainNode,
        osc_type: OscillatorType,
        freq: f32,
        level: f32,
    ) -> Option<OscillatorNode> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        gain.gain().set_value(level);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(master).ok()?;
        Some(osc)
    }
}

/// Audio manager for the game
pub struct AudioManager {
    graph: Option<AudioGraph>,
    sequencer: Sequencer,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Build the graph. Must be called from a user gesture or the context
    /// starts suspended.
    pub fn new() -> Self {
        let graph = AudioGraph::build();
        if graph.is_none() {
            log::warn!("Failed to build audio graph - audio disabled");
        }
        Self {
            graph,
            sequencer: Sequencer::new(),
            muted: false,
        }
    }

    /// Resume the context if the browser suspended it
    pub fn resume(&self) {
        if let Some(graph) = &self.graph
            && graph.ctx.state() == AudioContextState::Suspended
        {
            let _ = graph.ctx.resume();
        }
    }

    /// Silence everything (tab hidden) or bring it back
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(graph) = &self.graph {
            let level = if muted { 0.0 } else { MASTER_GAIN };
            let _ = graph
                .master
                .gain()
                .set_value_at_time(level, graph.ctx.current_time());
        }
    }

    /// Glide the continuous voices toward this frame's parameters
    pub fn update(&self, params: &AudioParams) {
        let Some(graph) = &self.graph else { return };
        let t = graph.ctx.current_time();

        let _ = graph
            .engine_osc
            .frequency()
            .set_target_at_time(params.engine_freq, t, ENGINE_GLIDE_SECS);
        let _ = graph
            .engine_filter
            .frequency()
            .set_target_at_time(params.engine_cutoff, t, ENGINE_GLIDE_SECS);
        let _ = graph
            .engine_gain
            .gain()
            .set_target_at_time(params.engine_gain, t, ENGINE_GLIDE_SECS);
        let _ = graph
            .music_osc
            .frequency()
            .set_value_at_time(params.music_freq, t);
    }

    /// Step the music loop by `dt` seconds
    pub fn advance_music(&mut self, dt: f32) {
        let Some(step) = self.sequencer.advance(dt) else {
            return;
        };
        let Some(graph) = &self.graph else { return };
        let t = graph.ctx.current_time();

        let _ = graph.arp_osc.frequency().set_value_at_time(step.arp, t);
        let _ = graph.bass_osc.frequency().set_value_at_time(step.bass, t);
        let _ = graph.pad_osc.frequency().set_value_at_time(step.pad, t);
    }

    /// One-shot burst of fading noise
    pub fn play_crash(&self) {
        if self.muted {
            return;
        }
        let Some(graph) = &self.graph else { return };
        let ctx = &graph.ctx;

        let rate = ctx.sample_rate();
        let len = (rate * CRASH_SECS) as usize;
        let samples = crash_samples(len, || js_sys::Math::random() as f32);

        let Ok(buffer) = ctx.create_buffer(1, len as u32, rate) else {
            return;
        };
        if buffer.copy_to_channel(&samples, 0).is_err() {
            return;
        }
        let Ok(source) = ctx.create_buffer_source() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };

        source.set_buffer(Some(&buffer));
        gain.gain().set_value(CRASH_GAIN);
        let _ = source.connect_with_audio_node(&gain);
        let _ = gain.connect_with_audio_node(&graph.master);
        let _ = source.start();
    }
}
