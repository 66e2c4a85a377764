use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, Result};

/// Identifier for a classification node, as assigned by the source sites.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClassificationId(pub i64);

impl std::fmt::Display for ClassificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node of the classification taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationNode {
    pub id: ClassificationId,
    pub name: String,
    pub parent: Option<ClassificationId>,
}

/// The full classification taxonomy for the catalog.
///
/// A tree is built wholesale and replaced wholesale; readers hold an `Arc`
/// snapshot, so every parent reference inside a snapshot resolves within
/// that same snapshot. The generation marker identifies which swap a
/// snapshot came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTree {
    generation: Uuid,
    nodes: HashMap<ClassificationId, ClassificationNode>,
}

impl ClassificationTree {
    /// An empty taxonomy, used before the first sync.
    pub fn empty() -> Self {
        Self {
            generation: Uuid::now_v7(),
            nodes: HashMap::new(),
        }
    }

    /// Build a tree from a flat node list, rejecting parent references that
    /// do not resolve inside the same batch. Duplicate ids collapse to the
    /// last node seen.
    pub fn from_nodes(nodes: Vec<ClassificationNode>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.insert(node.id, node);
        }
        for node in by_id.values() {
            if let Some(parent) = node.parent {
                if !by_id.contains_key(&parent) {
                    return Err(ModelError::DanglingClassificationParent {
                        child: node.id.0,
                        parent: parent.0,
                    });
                }
            }
        }
        Ok(Self {
            generation: Uuid::now_v7(),
            nodes: by_id,
        })
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ClassificationId) -> Option<&ClassificationNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ClassificationId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Top-level nodes, i.e. nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &ClassificationNode> {
        self.nodes.values().filter(|n| n.parent.is_none())
    }

    pub fn children_of(
        &self,
        parent: ClassificationId,
    ) -> impl Iterator<Item = &ClassificationNode> {
        self.nodes
            .values()
            .filter(move |n| n.parent == Some(parent))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassificationNode> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>) -> ClassificationNode {
        ClassificationNode {
            id: ClassificationId(id),
            name: format!("node-{id}"),
            parent: parent.map(ClassificationId),
        }
    }

    #[test]
    fn builds_tree_with_resolvable_parents() {
        let tree =
            ClassificationTree::from_nodes(vec![node(1, None), node(2, Some(1)), node(3, Some(1))])
                .expect("tree builds");

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots().count(), 1);
        assert_eq!(tree.children_of(ClassificationId(1)).count(), 2);
    }

    #[test]
    fn rejects_dangling_parent_reference() {
        let err = ClassificationTree::from_nodes(vec![node(1, None), node(2, Some(9))])
            .expect_err("dangling parent must fail the build");

        assert!(matches!(
            err,
            ModelError::DanglingClassificationParent { child: 2, parent: 9 }
        ));
    }

    #[test]
    fn duplicate_ids_collapse_to_last_node() {
        let mut second = node(1, None);
        second.name = "renamed".into();
        let tree = ClassificationTree::from_nodes(vec![node(1, None), second]).expect("builds");

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(ClassificationId(1)).unwrap().name, "renamed");
    }
}
