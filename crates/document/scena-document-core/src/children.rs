//! Child slots: named, typed containers for a node's children.
//!
//! A slot holds either exactly one child (`Single`) or an ordered sequence
//! (`List`). Membership here is index math over `NodeId`s only; the child's
//! parent back-link and the identifier-index rebuild are maintained by the
//! owning `Symbol`'s attach/detach primitives.

use scena_api_core::NodeId;

use crate::error::DocError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildSlotKind {
    Single(Option<NodeId>),
    List(Vec<NodeId>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildSlot {
    name: String,
    child_type: String,
    kind: ChildSlotKind,
}

impl ChildSlot {
    pub fn single(name: &str, child_type: &str) -> Self {
        Self {
            name: name.to_string(),
            child_type: child_type.to_string(),
            kind: ChildSlotKind::Single(None),
        }
    }

    pub fn list(name: &str, child_type: &str) -> Self {
        Self {
            name: name.to_string(),
            child_type: child_type.to_string(),
            kind: ChildSlotKind::List(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type tag of acceptable children.
    pub fn child_type(&self) -> &str {
        &self.child_type
    }

    pub fn kind(&self) -> &ChildSlotKind {
        &self.kind
    }

    pub fn is_single(&self) -> bool {
        matches!(self.kind, ChildSlotKind::Single(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, ChildSlotKind::List(_))
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            ChildSlotKind::Single(child) => usize::from(child.is_some()),
            ChildSlotKind::List(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current child of a single slot (None for list slots too).
    pub fn get_single(&self) -> Option<NodeId> {
        match &self.kind {
            ChildSlotKind::Single(child) => *child,
            ChildSlotKind::List(_) => None,
        }
    }

    pub fn at(&self, index: usize) -> Option<NodeId> {
        match &self.kind {
            ChildSlotKind::Single(child) => {
                if index == 0 {
                    *child
                } else {
                    None
                }
            }
            ChildSlotKind::List(children) => children.get(index).copied(),
        }
    }

    pub fn ids(&self) -> Vec<NodeId> {
        match &self.kind {
            ChildSlotKind::Single(child) => child.into_iter().copied().collect(),
            ChildSlotKind::List(children) => children.clone(),
        }
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        match &self.kind {
            ChildSlotKind::Single(current) => {
                if *current == Some(child) {
                    Some(0)
                } else {
                    None
                }
            }
            ChildSlotKind::List(children) => children.iter().position(|c| *c == child),
        }
    }

    /// Insert `child` at `index` (append when None). Returns the index the
    /// child landed at.
    pub(crate) fn insert_id(&mut self, index: Option<usize>, child: NodeId) -> Result<usize, DocError> {
        match &mut self.kind {
            ChildSlotKind::Single(current) => {
                if current.is_some() {
                    return Err(DocError::SlotArity {
                        slot: self.name.clone(),
                    });
                }
                if matches!(index, Some(i) if i > 0) {
                    return Err(DocError::IndexOutOfRange {
                        index: index.unwrap_or(0),
                        len: 0,
                    });
                }
                *current = Some(child);
                Ok(0)
            }
            ChildSlotKind::List(children) => {
                let at = index.unwrap_or(children.len());
                if at > children.len() {
                    return Err(DocError::IndexOutOfRange {
                        index: at,
                        len: children.len(),
                    });
                }
                children.insert(at, child);
                Ok(at)
            }
        }
    }

    /// Remove `child`, locating its current index. Returns that index.
    pub(crate) fn remove_id(&mut self, child: NodeId) -> Result<usize, DocError> {
        let index = self.index_of(child).ok_or_else(|| DocError::NotAChild {
            child,
            slot: self.name.clone(),
        })?;
        match &mut self.kind {
            ChildSlotKind::Single(current) => *current = None,
            ChildSlotKind::List(children) => {
                children.remove(index);
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_insert_remove_indices() {
        let mut slot = ChildSlot::list("layers", "layer");
        assert_eq!(slot.insert_id(None, NodeId(1)), Ok(0));
        assert_eq!(slot.insert_id(None, NodeId(2)), Ok(1));
        assert_eq!(slot.insert_id(Some(1), NodeId(3)), Ok(1));
        assert_eq!(slot.ids(), vec![NodeId(1), NodeId(3), NodeId(2)]);
        assert_eq!(slot.remove_id(NodeId(3)), Ok(1));
        assert_eq!(
            slot.remove_id(NodeId(9)),
            Err(DocError::NotAChild {
                child: NodeId(9),
                slot: "layers".into()
            })
        );
    }

    #[test]
    fn single_slot_rejects_second_child() {
        let mut slot = ChildSlot::single("fill", "paint");
        slot.insert_id(None, NodeId(1)).unwrap();
        assert!(matches!(
            slot.insert_id(None, NodeId(2)),
            Err(DocError::SlotArity { .. })
        ));
    }
}
