//! Node type registry: explicit type-tag to factory lookup.
//!
//! Constructed once at startup and passed by reference into every loader or
//! constructor that needs it; never ambient global state, so tests can
//! supply isolated registries.

use hashbrown::HashMap;

use scena_api_core::NodeId;

use crate::node::Node;

pub trait NodeFactory {
    /// Construct a default node of this type with the given identifier.
    fn create(&self, id: NodeId) -> Node;
}

/// Plain functions and closures work as factories.
impl<F> NodeFactory for F
where
    F: Fn(NodeId) -> Node,
{
    fn create(&self, id: NodeId) -> Node {
        self(id)
    }
}

#[derive(Default)]
pub struct NodeRegistry {
    factories: HashMap<String, Box<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_tag: &str, factory: impl NodeFactory + 'static) {
        self.factories.insert(type_tag.to_string(), Box::new(factory));
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    pub fn create(&self, type_tag: &str, id: NodeId) -> Option<Node> {
        self.factories.get(type_tag).map(|f| f.create(id))
    }

    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
