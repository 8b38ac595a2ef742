use serde::{Deserialize, Serialize};

/// Narrows the set of nodes a task operates on.
///
/// An absent filter means every node in scope. The service accepts any
/// combination of names, racks and tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NodeFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rack_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_tags: Vec<String>,
}

impl NodeFilter {
    /// Filter matching a single server, used when redeploying one node.
    pub fn for_server(name: impl Into<String>) -> Self {
        Self {
            node_names: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty() && self.rack_names.is_empty() && self.node_tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_server() {
        let filter = NodeFilter::for_server("cab23-r720-17");
        assert_eq!(filter.node_names, vec!["cab23-r720-17"]);
        assert!(filter.rack_names.is_empty());
        assert!(filter.node_tags.is_empty());
    }

    #[test]
    fn test_empty_filter_serializes_to_empty_object() {
        let filter = NodeFilter::default();
        assert!(filter.is_empty());
        assert_eq!(serde_json::to_string(&filter).unwrap(), "{}");
    }

    #[test]
    fn test_filter_wire_names() {
        let filter = NodeFilter {
            node_names: vec!["n1".to_string()],
            rack_names: vec!["rack01".to_string()],
            node_tags: vec![],
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["node_names"][0], "n1");
        assert_eq!(json["rack_names"][0], "rack01");
    }
}
