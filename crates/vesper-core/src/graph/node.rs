//! Node handles for the processing graph.

/// Stable handle to a node owned by an [`AudioGraph`](super::AudioGraph).
///
/// Node IDs are assigned from a monotonically increasing counter and never
/// reused within a graph instance, so a stale handle can never alias a newer
/// node. Ordering follows assignment order, which the scheduler uses as its
/// tie-break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}
