//! Directional link descriptors attached to nodes

use serde::{Deserialize, Serialize};

/// Metadata key that carries a document's links before it becomes a node
pub const METADATA_LINKS_KEY: &str = "links";

/// Polarity of a link descriptor
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
    Bidirectional,
}

impl Direction {
    /// True if a link with this direction can be the source end of an edge
    pub fn is_outgoing(self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Bidirectional)
    }

    /// True if a link with this direction can be the target end of an edge
    pub fn is_incoming(self) -> bool {
        matches!(self, Direction::Incoming | Direction::Bidirectional)
    }
}

/// A typed edge descriptor. Two nodes are connected when one carries an
/// outgoing link and the other an incoming link with the same kind and tag.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub kind: String,
    pub direction: Direction,
    pub tag: String,
}

impl Link {
    pub fn new(kind: impl Into<String>, direction: Direction, tag: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            direction,
            tag: tag.into(),
        }
    }

    pub fn incoming(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, Direction::Incoming, tag)
    }

    pub fn outgoing(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, Direction::Outgoing, tag)
    }

    pub fn bidir(kind: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(kind, Direction::Bidirectional, tag)
    }

    /// Whether `self` (on the source node) and `target` (on the target node)
    /// imply an edge source -> target.
    pub fn connects_to(&self, target: &Link) -> bool {
        self.direction.is_outgoing()
            && target.direction.is_incoming()
            && self.kind == target.kind
            && self.tag == target.tag
    }
}

/// True if any link in `source` connects to any link in `target`
pub fn has_edge(source: &[Link], target: &[Link]) -> bool {
    source
        .iter()
        .filter(|l| l.direction.is_outgoing())
        .any(|out| target.iter().any(|inc| out.connects_to(inc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_matches_incoming() {
        let a = Link::outgoing("hyperlink", "https://some-url");
        let b = Link::incoming("hyperlink", "https://some-url");
        assert!(a.connects_to(&b));
        assert!(!b.connects_to(&a));
    }

    #[test]
    fn test_kind_and_tag_must_agree() {
        let a = Link::outgoing("hyperlink", "u");
        assert!(!a.connects_to(&Link::incoming("keyword", "u")));
        assert!(!a.connects_to(&Link::incoming("hyperlink", "v")));
    }

    #[test]
    fn test_bidir_both_ways() {
        let a = vec![Link::bidir("kw", "rust")];
        let b = vec![Link::bidir("kw", "rust")];
        assert!(has_edge(&a, &b));
        assert!(has_edge(&b, &a));

        let c = vec![Link::incoming("kw", "rust")];
        assert!(has_edge(&a, &c));
        assert!(!has_edge(&c, &a));
    }

    #[test]
    fn test_direction_serde() {
        let link = Link::bidir("kw", "x");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["direction"], "bidirectional");
        let back: Link = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }
}
