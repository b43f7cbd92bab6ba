//! Serialized form of trigger trees.
//!
//! Every node becomes `{ "type": <tag>, "data": <payload> }`. A connector's
//! payload is `{ "connectorType": "AND" | "OR" | "XOR", "triggerList": [..] }`
//! with one nested document per child, in order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tree::{NodeId, NodeKind, TriggerTree};
use super::{ConnectorType, TriggerRegistry};
use crate::error::TreeError;

/// Tag of connector documents.
pub const CONNECTOR_TAG: &str = "ruletree.connector";

const CONNECTOR_TYPE_FIELD: &str = "connectorType";
const TRIGGER_LIST_FIELD: &str = "triggerList";

/// A serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub data: Value,
}

impl Document {
    #[must_use]
    pub fn new(type_tag: impl Into<String>, data: Value) -> Self {
        Self {
            type_tag: type_tag.into(),
            data,
        }
    }

    #[must_use]
    pub fn is_connector(&self) -> bool {
        self.type_tag == CONNECTOR_TAG
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MalformedDocument`] when the text is not a
    /// document.
    pub fn from_json(text: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the document as JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        Value::from(self).to_string()
    }

    /// Decode a `triggerList` entry: either a nested object or a string
    /// holding the JSON of one, as older stores wrote them.
    fn from_entry(entry: &Value) -> Result<Self, TreeError> {
        match entry {
            Value::String(text) => Self::from_json(text),
            other => Ok(Self::deserialize(other)?),
        }
    }
}

impl From<&Document> for Value {
    fn from(document: &Document) -> Self {
        serde_json::json!({
            "type": document.type_tag,
            "data": document.data,
        })
    }
}

fn malformed(reason: &str) -> TreeError {
    TreeError::MalformedDocument(reason.to_string())
}

/// Read the `connectorType` and `triggerList` fields of a connector payload.
fn connector_fields(data: &Value) -> Result<(ConnectorType, &[Value]), TreeError> {
    let fields = data
        .as_object()
        .ok_or_else(|| malformed("connector data must be an object"))?;
    let connector_type = fields
        .get(CONNECTOR_TYPE_FIELD)
        .ok_or_else(|| malformed("missing connectorType"))?
        .as_str()
        .ok_or_else(|| malformed("connectorType must be a string"))?
        .parse::<ConnectorType>()?;
    let entries = fields
        .get(TRIGGER_LIST_FIELD)
        .ok_or_else(|| malformed("missing triggerList"))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| malformed("triggerList must be an array"))?;
    Ok((connector_type, entries))
}

impl TriggerTree {
    /// Serialize the whole tree.
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.document_of(self.root())
    }

    /// Serialize the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle.
    pub fn node_document(&self, id: NodeId) -> Result<Document, TreeError> {
        self.kind(id)?;
        Ok(self.document_of(id))
    }

    fn document_of(&self, id: NodeId) -> Document {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(trigger) => Document::new(trigger.type_tag(), trigger.to_data()),
            NodeKind::Connector(connector) => {
                let trigger_list: Vec<Value> = connector
                    .children
                    .iter()
                    .map(|child| Value::from(&self.document_of(*child)))
                    .collect();
                Document::new(
                    CONNECTOR_TAG,
                    serde_json::json!({
                        CONNECTOR_TYPE_FIELD: connector.connector_type.as_str(),
                        TRIGGER_LIST_FIELD: trigger_list,
                    }),
                )
            }
        }
    }

    /// Build a tree from a connector document.
    ///
    /// Any failure in a nested document fails the whole tree; no partially
    /// built tree is ever returned.
    ///
    /// # Errors
    ///
    /// - [`TreeError::MalformedDocument`] when a field is missing, a nested
    ///   document cannot be parsed, or the root is not a connector.
    /// - [`TreeError::UnknownConnectorType`] for an unrecognised operator.
    /// - [`TreeError::UnknownTriggerType`] when a leaf tag is not registered.
    pub fn from_document(
        document: &Document,
        registry: &TriggerRegistry,
    ) -> Result<Self, TreeError> {
        if !document.is_connector() {
            return Err(TreeError::MalformedDocument(format!(
                "root must be a connector, got {:?}",
                document.type_tag
            )));
        }
        let (connector_type, entries) = connector_fields(&document.data)?;
        let mut tree = Self::with_type(connector_type);
        let root = tree.root();
        for entry in entries {
            let child = tree.load_document(&Document::from_entry(entry)?, registry)?;
            tree.add(root, child)?;
        }
        Ok(tree)
    }

    /// Parse and build a tree from JSON text.
    ///
    /// # Errors
    ///
    /// See [`TriggerTree::from_document`].
    pub fn from_json(text: &str, registry: &TriggerRegistry) -> Result<Self, TreeError> {
        Self::from_document(&Document::from_json(text)?, registry)
    }

    /// Build the subtree described by `document` as a detached node.
    ///
    /// On failure every node created so far is freed again.
    ///
    /// # Errors
    ///
    /// See [`TriggerTree::from_document`].
    pub fn load_document(
        &mut self,
        document: &Document,
        registry: &TriggerRegistry,
    ) -> Result<NodeId, TreeError> {
        if !document.is_connector() {
            let mut trigger = registry.resolve(&document.type_tag)?;
            trigger.load(&document.data)?;
            return Ok(self.new_leaf(trigger));
        }

        let (connector_type, entries) = connector_fields(&document.data)?;
        let id = self.new_connector(connector_type);
        for entry in entries {
            let loaded = Document::from_entry(entry)
                .and_then(|child| self.load_document(&child, registry))
                .and_then(|child| self.add(id, child));
            if let Err(err) = loaded {
                self.discard(id)?;
                return Err(err);
            }
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tree::tests::{connector, leaf};
    use super::*;
    use crate::trigger::ConstantTrigger;

    fn constant(value: bool) -> Value {
        serde_json::json!({ "type": ConstantTrigger::TAG, "data": { "value": value } })
    }

    #[test]
    fn should_serialize_connector_with_exact_keys() {
        let mut tree = TriggerTree::with_type(ConnectorType::Or);
        let root = tree.root();
        leaf(&mut tree, root, true);
        let and = connector(&mut tree, root, ConnectorType::And);
        leaf(&mut tree, and, false);

        let json = Value::from(&tree.to_document());

        assert_eq!(
            json,
            serde_json::json!({
                "type": CONNECTOR_TAG,
                "data": {
                    "connectorType": "OR",
                    "triggerList": [
                        constant(true),
                        {
                            "type": CONNECTOR_TAG,
                            "data": { "connectorType": "AND", "triggerList": [constant(false)] }
                        }
                    ]
                }
            })
        );
    }

    #[test]
    fn should_serialize_a_single_subtree() {
        let mut tree = TriggerTree::with_type(ConnectorType::Or);
        let root = tree.root();
        leaf(&mut tree, root, true);
        let and = connector(&mut tree, root, ConnectorType::And);
        leaf(&mut tree, and, false);

        let document = tree.node_document(and).unwrap();

        assert_eq!(
            Value::from(&document),
            serde_json::json!({
                "type": CONNECTOR_TAG,
                "data": { "connectorType": "AND", "triggerList": [constant(false)] }
            })
        );
    }

    #[test]
    fn should_fail_serializing_a_discarded_node() {
        let mut tree = TriggerTree::new();
        let root = tree.root();
        let gone = leaf(&mut tree, root, true);
        tree.discard(gone).unwrap();

        assert_eq!(tree.node_document(gone), Err(TreeError::UnknownNode(gone)));
    }

    #[test]
    fn should_roundtrip_structure_and_behaviour() {
        let mut tree = TriggerTree::with_type(ConnectorType::Xor);
        let root = tree.root();
        leaf(&mut tree, root, true);
        let or = connector(&mut tree, root, ConnectorType::Or);
        leaf(&mut tree, or, false);
        leaf(&mut tree, or, false);
        leaf(&mut tree, root, false);

        let registry = TriggerRegistry::with_builtins();
        let parsed = TriggerTree::from_json(&tree.to_document().to_json(), &registry).unwrap();

        assert_eq!(parsed.evaluate(), tree.evaluate());
        assert_eq!(parsed.describe(), tree.describe());
        assert_eq!(parsed.to_document(), tree.to_document());
    }

    #[test]
    fn should_accept_string_encoded_nested_documents() {
        let nested = serde_json::json!({
            "type": CONNECTOR_TAG,
            "data": { "connectorType": "OR", "triggerList": [constant(false).to_string()] }
        });
        let document = Document::new(
            CONNECTOR_TAG,
            serde_json::json!({
                "connectorType": "AND",
                "triggerList": [constant(true).to_string(), nested.to_string()]
            }),
        );

        let tree = TriggerTree::from_document(&document, &TriggerRegistry::with_builtins()).unwrap();

        assert_eq!(tree.describe(), "always and never");
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn should_fail_with_unknown_connector_type() {
        let document = Document::new(
            CONNECTOR_TAG,
            serde_json::json!({ "connectorType": "NOR", "triggerList": [] }),
        );
        let err = TriggerTree::from_document(&document, &TriggerRegistry::new()).unwrap_err();
        assert_eq!(err, TreeError::UnknownConnectorType("NOR".to_string()));
    }

    #[test]
    fn should_fail_with_malformed_document_when_connector_type_missing() {
        let document = Document::new(CONNECTOR_TAG, serde_json::json!({ "triggerList": [] }));
        let err = TriggerTree::from_document(&document, &TriggerRegistry::new()).unwrap_err();
        assert!(matches!(err, TreeError::MalformedDocument(_)));
    }

    #[test]
    fn should_fail_with_malformed_document_when_trigger_list_missing() {
        let document = Document::new(CONNECTOR_TAG, serde_json::json!({ "connectorType": "OR" }));
        let err = TriggerTree::from_document(&document, &TriggerRegistry::new()).unwrap_err();
        assert!(matches!(err, TreeError::MalformedDocument(_)));
    }

    #[test]
    fn should_fail_with_malformed_document_when_nested_entry_unparseable() {
        let document = Document::new(
            CONNECTOR_TAG,
            serde_json::json!({ "connectorType": "AND", "triggerList": ["{not json"] }),
        );
        let err = TriggerTree::from_document(&document, &TriggerRegistry::with_builtins())
            .unwrap_err();
        assert!(matches!(err, TreeError::MalformedDocument(_)));
    }

    #[test]
    fn should_fail_whole_tree_when_nested_trigger_type_unknown() {
        let document = Document::new(
            CONNECTOR_TAG,
            serde_json::json!({
                "connectorType": "AND",
                "triggerList": [
                    constant(true),
                    {
                        "type": CONNECTOR_TAG,
                        "data": {
                            "connectorType": "OR",
                            "triggerList": [constant(true), { "type": "glucose", "data": {} }]
                        }
                    }
                ]
            }),
        );
        let err = TriggerTree::from_document(&document, &TriggerRegistry::with_builtins())
            .unwrap_err();
        assert_eq!(err, TreeError::UnknownTriggerType("glucose".to_string()));
    }

    #[test]
    fn should_free_partial_subtree_when_loading_fails() {
        let mut tree = TriggerTree::new();
        let document = Document::new(
            CONNECTOR_TAG,
            serde_json::json!({
                "connectorType": "OR",
                "triggerList": [constant(true), { "type": "glucose", "data": {} }]
            }),
        );

        let result = tree.load_document(&document, &TriggerRegistry::with_builtins());

        assert!(result.is_err());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn should_reject_leaf_document_as_root() {
        let document = Document::from_json(&constant(true).to_string()).unwrap();
        let err = TriggerTree::from_document(&document, &TriggerRegistry::with_builtins())
            .unwrap_err();
        assert!(matches!(err, TreeError::MalformedDocument(_)));
    }
}
