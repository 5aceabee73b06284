//! Music cues: one-at-a-time background tracks.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use vesper_core::{AudioGraph, Gain, NodeId};

use crate::sample::SampleLoader;
use crate::sampler::{Sampler, SamplerConfig};

/// A named music track.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicCue {
    /// Name used to start the cue.
    pub slug: String,
    /// Asset name handed to the [`SampleLoader`].
    pub file_name: String,
    /// Restart from the top when the track ends. Defaults to true.
    pub looping: bool,
    /// Playback gain.
    pub gain: f32,
}

impl MusicCue {
    /// Creates a looping cue at unity gain.
    pub fn new(slug: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            file_name: file_name.into(),
            looping: true,
            gain: 1.0,
        }
    }
}

/// Plays at most one [`MusicCue`] at a time.
///
/// Each cue gets a single-voice sampler feeding a unity-gain bus. Starting a
/// cue stops whichever cue is playing.
#[derive(Debug, Clone)]
pub struct MusicCueOrchestrator {
    output: NodeId,
    cues: BTreeMap<String, NodeId>,
    current: Option<NodeId>,
}

impl MusicCueOrchestrator {
    /// Adds the bus and one sampler per cue to `graph`.
    pub fn new<L: SampleLoader + ?Sized>(
        graph: &mut AudioGraph,
        cues: Vec<MusicCue>,
        loader: &L,
    ) -> Self {
        let output = graph.add_node(|ctx| Gain::new(ctx, 1.0));
        let mut map = BTreeMap::new();

        for cue in cues {
            let config = SamplerConfig::default()
                .with_looping(cue.looping)
                .with_gain(cue.gain);
            let id = graph.add_node(|ctx| Sampler::new(ctx, loader.load(&cue.file_name, ctx), config));
            graph.connect(id, output);
            map.insert(cue.slug, id);
        }

        Self {
            output,
            cues: map,
            current: None,
        }
    }

    /// Stops the current cue, then starts `slug` from the top.
    ///
    /// Returns false and changes nothing for an unknown slug.
    pub fn play_cue(&mut self, graph: &mut AudioGraph, slug: &str) -> bool {
        let Some(&id) = self.cues.get(slug) else {
            return false;
        };
        self.stop_cue(graph);
        let Some(sampler) = graph.node_mut::<Sampler>(id) else {
            return false;
        };
        sampler.note_on();
        self.current = Some(id);

        #[cfg(feature = "tracing")]
        tracing::debug!(slug, "music_cue: playing");
        true
    }

    /// Stops the current cue, if any.
    pub fn stop_cue(&mut self, graph: &mut AudioGraph) {
        let Some(id) = self.current.take() else {
            return;
        };
        if let Some(sampler) = graph.node_mut::<Sampler>(id) {
            sampler.note_off();
        }
    }

    /// Slug of the cue started most recently and not yet stopped.
    pub fn current_cue(&self) -> Option<&str> {
        let current = self.current?;
        self.cues
            .iter()
            .find(|&(_, &id)| id == current)
            .map(|(slug, _)| slug.as_str())
    }

    /// The shared output bus.
    pub fn output_node(&self) -> NodeId {
        self.output
    }

    /// Node id of the sampler for `slug`.
    pub fn cue_node(&self, slug: &str) -> Option<NodeId> {
        self.cues.get(slug).copied()
    }
}
