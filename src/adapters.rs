//! Conversions between flat content records and graph nodes.
//!
//! The links of a document travel in its metadata under
//! [`METADATA_LINKS_KEY`]. This is the only place that key is read or
//! written, and its shape is validated here rather than at search time.

use serde_json::{json, Value};

use crate::error::{ArityMismatch, GraphStoreError, Result};
use crate::links::{Link, METADATA_LINKS_KEY};
use crate::types::{Document, Metadata, Node};

/// Zip texts with optional metadatas and ids into nodes.
///
/// Every supplied sequence must have exactly as many items as `texts`.
pub fn texts_to_nodes(
    texts: Vec<String>,
    metadatas: Option<Vec<Metadata>>,
    ids: Option<Vec<String>>,
) -> Result<Vec<Node>> {
    let mut metadatas_it = metadatas.map(Vec::into_iter);
    let mut ids_it = ids.map(Vec::into_iter);

    let mut nodes = Vec::with_capacity(texts.len());
    for text in texts {
        let mut metadata = match metadatas_it.as_mut() {
            Some(it) => it
                .next()
                .ok_or(GraphStoreError::Arity(ArityMismatch::TextsLongerThanMetadatas))?,
            None => Metadata::new(),
        };
        let id = match ids_it.as_mut() {
            Some(it) => Some(
                it.next()
                    .ok_or(GraphStoreError::Arity(ArityMismatch::TextsLongerThanIds))?,
            ),
            None => None,
        };
        let links = take_links(&mut metadata)?;
        nodes.push(Node {
            id,
            text,
            metadata,
            links,
        });
    }

    if ids_it.is_some_and(|mut it| it.next().is_some()) {
        return Err(GraphStoreError::Arity(ArityMismatch::IdsLongerThanTexts));
    }
    if metadatas_it.is_some_and(|mut it| it.next().is_some()) {
        return Err(GraphStoreError::Arity(ArityMismatch::MetadatasLongerThanTexts));
    }

    Ok(nodes)
}

/// Convert documents to nodes, moving the links entry out of the metadata
pub fn documents_to_nodes(documents: &[Document]) -> Result<Vec<Node>> {
    documents.iter().map(document_to_node).collect()
}

pub fn document_to_node(doc: &Document) -> Result<Node> {
    let mut metadata = doc.metadata.clone();
    let links = take_links(&mut metadata)?;
    Ok(Node {
        id: doc.id.clone(),
        text: doc.page_content.clone(),
        metadata,
        links,
    })
}

/// Convert nodes back to documents, re-injecting the links entry
pub fn nodes_to_documents(nodes: Vec<Node>) -> Vec<Document> {
    nodes.into_iter().map(node_to_document).collect()
}

pub fn node_to_document(node: Node) -> Document {
    let mut metadata = node.metadata;
    metadata.insert(METADATA_LINKS_KEY.to_string(), json!(node.links));
    Document {
        id: node.id,
        page_content: node.text,
        metadata,
    }
}

/// Remove the links entry from `metadata` and parse it.
///
/// A single link object is accepted and treated as a one-element list.
fn take_links(metadata: &mut Metadata) -> Result<Vec<Link>> {
    let value = match metadata.remove(METADATA_LINKS_KEY) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => value,
    };
    let value = match value {
        Value::Object(_) => Value::Array(vec![value]),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| GraphStoreError::InvalidLinks(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_texts_to_nodes_extracts_links() {
        let metadatas = vec![
            meta(json!({"a": 1, "links": [{"kind": "hyperlink", "direction": "incoming", "tag": "u"}]})),
            meta(json!({"b": 2})),
        ];
        let original = metadatas.clone();
        let nodes = texts_to_nodes(
            vec!["t1".into(), "t2".into()],
            Some(metadatas),
            Some(vec!["a".into(), "b".into()]),
        )
        .unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id.as_deref(), Some("a"));
        assert_eq!(nodes[0].text, "t1");
        assert_eq!(nodes[0].links, vec![Link::incoming("hyperlink", "u")]);
        assert!(!nodes[0].metadata.contains_key(METADATA_LINKS_KEY));
        assert_eq!(nodes[0].metadata["a"], json!(1));
        assert!(nodes[1].links.is_empty());
        // caller metadata untouched
        assert!(original[0].contains_key(METADATA_LINKS_KEY));
    }

    #[test]
    fn test_texts_without_metadata_or_ids() {
        let nodes = texts_to_nodes(vec!["x".into()], None, None).unwrap();
        assert_eq!(nodes, vec![Node::new("x")]);
    }

    #[test]
    fn test_arity_mismatches() {
        let texts = || vec!["a".to_string(), "b".to_string()];

        let err = texts_to_nodes(texts(), Some(vec![Metadata::new()]), None).unwrap_err();
        assert!(matches!(err, GraphStoreError::Arity(ArityMismatch::TextsLongerThanMetadatas)));

        let err = texts_to_nodes(texts(), None, Some(vec!["1".into()])).unwrap_err();
        assert!(matches!(err, GraphStoreError::Arity(ArityMismatch::TextsLongerThanIds)));

        let err = texts_to_nodes(texts(), None, Some(vec!["1".into(), "2".into(), "3".into()]))
            .unwrap_err();
        assert_eq!(err.to_string(), "ids iterable longer than texts");

        let err = texts_to_nodes(texts(), Some(vec![Metadata::new(); 3]), None).unwrap_err();
        assert_eq!(err.to_string(), "metadatas iterable longer than texts");
        assert!(err.is_validation());
    }

    #[test]
    fn test_single_link_object_is_coerced() {
        let doc = Document::new("x").with_metadata(meta(
            json!({"links": {"kind": "kw", "direction": "bidirectional", "tag": "t"}}),
        ));
        let node = document_to_node(&doc).unwrap();
        assert_eq!(node.links, vec![Link::bidir("kw", "t")]);
    }

    #[test]
    fn test_malformed_links_rejected() {
        let doc = Document::new("x").with_metadata(meta(json!({"links": "nope"})));
        let err = document_to_node(&doc).unwrap_err();
        assert!(matches!(err, GraphStoreError::InvalidLinks(_)));

        let doc = Document::new("x").with_metadata(meta(
            json!({"links": [{"kind": "kw", "direction": "sideways", "tag": "t"}]}),
        ));
        assert!(document_to_node(&doc).is_err());
    }

    #[test]
    fn test_document_round_trip() {
        let doc = Document::new("some text a")
            .with_id("a")
            .with_metadata(meta(json!({
                "source": "web",
                "links": [
                    {"kind": "hyperlink", "direction": "incoming", "tag": "https://some-url"},
                    {"kind": "kw", "direction": "bidirectional", "tag": "rust"}
                ]
            })));
        let nodes = documents_to_nodes(std::slice::from_ref(&doc)).unwrap();
        assert_eq!(nodes[0].links.len(), 2);
        assert_eq!(nodes_to_documents(nodes), vec![doc]);
    }

    #[test]
    fn test_node_to_document_always_has_links_entry() {
        let doc = node_to_document(Node::new("plain"));
        assert_eq!(doc.metadata[METADATA_LINKS_KEY], json!([]));
    }
}
