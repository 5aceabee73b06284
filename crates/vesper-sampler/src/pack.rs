//! Named sets of one-shot samples routed to a shared output bus.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use vesper_core::{AudioGraph, EnvConfig, FilterConfig, Gain, NodeId};

use crate::sample::SampleLoader;
use crate::sampler::{Sampler, SamplerConfig};

/// One entry of a [`SamplePack`].
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePackItem {
    /// Name used to trigger the sample.
    pub slug: String,
    /// Asset name handed to the [`SampleLoader`].
    pub file_name: String,
    /// Voice pool size.
    pub polyphony: usize,
    /// Restart from the top when the sample ends.
    pub looping: bool,
    /// Playback gain.
    pub gain: f32,
    /// Pitch offset in semitones.
    pub pitch_shift: i32,
    /// Optional per-voice envelope.
    pub envelope: Option<EnvConfig>,
    /// Optional per-voice filter.
    pub filter: Option<FilterConfig>,
}

impl SamplePackItem {
    /// Creates an item with a single voice, no looping and unity gain.
    pub fn new(slug: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            file_name: file_name.into(),
            polyphony: 1,
            looping: false,
            gain: 1.0,
            pitch_shift: 0,
            envelope: None,
            filter: None,
        }
    }

    /// Playback settings for this item's sampler.
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            polyphony: self.polyphony,
            looping: self.looping,
            gain: self.gain,
            pitch_shift: self.pitch_shift,
            envelope: self.envelope,
            filter: self.filter,
        }
    }
}

/// A bank of samplers, one per item, summed through one [`Gain`] bus.
///
/// The pack only holds node ids; the graph owns the nodes. Every operation
/// therefore takes the graph it was built in.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, AudioGraph, Buffer};
/// use vesper_sampler::{SampleData, SamplePack, SamplePackItem};
///
/// let ctx = AudioContext::new(4, 1, 48000.0);
/// let mut graph = AudioGraph::new(ctx);
/// let loader = |_: &str, _: &AudioContext| SampleData::from_interleaved(vec![0.5; 4], 1);
///
/// let pack = SamplePack::new(&mut graph, vec![SamplePackItem::new("kick", "kick.wav")], 1.0, &loader);
/// assert!(pack.trigger(&mut graph, "kick"));
/// assert!(!pack.trigger(&mut graph, "snare"));
///
/// let mut out = Buffer::new(&ctx);
/// graph.render(&mut out);
/// assert_eq!(out.as_slice(), &[0.5; 4]);
/// ```
#[derive(Debug, Clone)]
pub struct SamplePack {
    output: NodeId,
    samplers: BTreeMap<String, NodeId>,
}

impl SamplePack {
    /// Adds an output bus with gain `gain` and one sampler per item to
    /// `graph`, loading each item's sample through `loader`.
    ///
    /// A later item with a slug already in use replaces the earlier one for
    /// triggering; both stay in the graph.
    pub fn new<L: SampleLoader + ?Sized>(
        graph: &mut AudioGraph,
        items: Vec<SamplePackItem>,
        gain: f32,
        loader: &L,
    ) -> Self {
        let output = graph.add_node(|ctx| Gain::new(ctx, gain));
        let mut samplers = BTreeMap::new();

        for item in items {
            let config = item.sampler_config();
            let file_name = item.file_name;
            let id = graph.add_node(|ctx| Sampler::new(ctx, loader.load(&file_name, ctx), config));
            graph.connect(id, output);

            #[cfg(feature = "tracing")]
            tracing::debug!(slug = %item.slug, node = %id, "sample_pack: added sampler");
            samplers.insert(item.slug, id);
        }

        Self { output, samplers }
    }

    /// Starts a note on the sampler named `slug`. Returns false for an
    /// unknown slug.
    pub fn trigger(&self, graph: &mut AudioGraph, slug: &str) -> bool {
        self.with_sampler(graph, slug, |sampler| {
            sampler.note_on();
        })
    }

    /// Releases every voice of the sampler named `slug`. Returns false for
    /// an unknown slug.
    pub fn release(&self, graph: &mut AudioGraph, slug: &str) -> bool {
        self.with_sampler(graph, slug, Sampler::note_off)
    }

    /// The shared output bus.
    pub fn output_node(&self) -> NodeId {
        self.output
    }

    /// Node id of the sampler named `slug`.
    pub fn sampler_node(&self, slug: &str) -> Option<NodeId> {
        self.samplers.get(slug).copied()
    }

    /// Every slug in the pack, in sorted order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.samplers.keys().map(String::as_str)
    }

    fn with_sampler(&self, graph: &mut AudioGraph, slug: &str, f: impl FnOnce(&mut Sampler)) -> bool {
        match self
            .sampler_node(slug)
            .and_then(|id| graph.node_mut::<Sampler>(id))
        {
            Some(sampler) => {
                f(sampler);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleData;
    use vesper_core::{AudioContext, Buffer};

    fn ctx() -> AudioContext {
        AudioContext::new(4, 1, 48000.0)
    }

    /// Returns a constant sample whose level encodes the file name length.
    fn loader(name: &str, _ctx: &AudioContext) -> SampleData {
        SampleData::from_interleaved(vec![name.len() as f32 * 0.1; 8], 1)
    }

    fn items() -> Vec<SamplePackItem> {
        vec![
            SamplePackItem::new("a", "a"),
            SamplePackItem {
                gain: 0.5,
                ..SamplePackItem::new("bb", "bb")
            },
        ]
    }

    #[test]
    fn test_builds_bus_and_samplers() {
        let mut graph = AudioGraph::new(ctx());
        let pack = SamplePack::new(&mut graph, items(), 1.0, &loader);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(pack.slugs().collect::<Vec<_>>(), vec!["a", "bb"]);
        let a = pack.sampler_node("a").unwrap();
        assert_eq!(graph.destinations_of(a), &[pack.output_node()]);
        assert!(graph.is_sink(pack.output_node()));
        assert_eq!(graph.node::<Gain>(pack.output_node()).unwrap().gain(), 1.0);
    }

    #[test]
    fn test_trigger_mixes_through_bus() {
        let ctx = ctx();
        let mut graph = AudioGraph::new(ctx);
        let pack = SamplePack::new(&mut graph, items(), 2.0, &loader);

        assert!(pack.trigger(&mut graph, "a"));
        assert!(pack.trigger(&mut graph, "bb"));
        let mut out = Buffer::new(&ctx);
        graph.render(&mut out);
        // (0.1 + 0.2 * 0.5) * 2.0
        for s in out.as_slice() {
            assert!((s - 0.4).abs() < 1e-6, "got {s}");
        }
    }

    #[test]
    fn test_unknown_slug_is_ignored() {
        let mut graph = AudioGraph::new(ctx());
        let pack = SamplePack::new(&mut graph, items(), 1.0, &loader);
        assert!(!pack.trigger(&mut graph, "missing"));
        assert!(!pack.release(&mut graph, "missing"));
        assert!(pack.sampler_node("missing").is_none());
    }

    #[test]
    fn test_release_stops_unenveloped_sampler() {
        let mut graph = AudioGraph::new(ctx());
        let pack = SamplePack::new(&mut graph, items(), 1.0, &loader);
        pack.trigger(&mut graph, "a");
        let id = pack.sampler_node("a").unwrap();
        assert_eq!(graph.node::<Sampler>(id).unwrap().active_voice_count(), 1);
        assert!(pack.release(&mut graph, "a"));
        assert_eq!(graph.node::<Sampler>(id).unwrap().active_voice_count(), 0);
    }

    #[test]
    fn test_item_settings_reach_sampler() {
        let mut graph = AudioGraph::new(ctx());
        let item = SamplePackItem {
            polyphony: 4,
            looping: true,
            pitch_shift: -3,
            ..SamplePackItem::new("pad", "pad.wav")
        };
        let pack = SamplePack::new(&mut graph, vec![item], 1.0, &loader);
        let sampler = graph
            .node::<Sampler>(pack.sampler_node("pad").unwrap())
            .unwrap();
        assert_eq!(sampler.polyphony(), 4);
        assert!(sampler.config().looping);
        assert_eq!(sampler.config().pitch_shift, -3);
        assert_eq!(sampler.sample().frames(), 8);
    }
}
