// Module ownership tree
// Parents own children (Arc); children point back with Weak.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::application::module::Module;
use crate::domain::error::{DomainError, Result};

/// Serializes structural mutations against readers across all trees, so a
/// reparent is never observed half-done.
static TREE_LOCK: RwLock<()> = RwLock::new(());

#[derive(Default)]
struct Links {
    parent: Weak<ModuleNode>,
    children: Vec<Arc<ModuleNode>>,
}

/// A module wrapped with parent/child relationships
pub struct ModuleNode {
    module: AsyncMutex<Box<dyn Module>>,
    links: Mutex<Links>,
}

impl ModuleNode {
    /// Create a root node
    pub fn new(module: Box<dyn Module>) -> Arc<Self> {
        Arc::new(Self {
            module: AsyncMutex::new(module),
            links: Mutex::new(Links::default()),
        })
    }

    /// Create a node already adopted by `parent`
    pub fn new_child(module: Box<dyn Module>, parent: &Arc<Self>) -> Result<Arc<Self>> {
        let node = Self::new(module);
        node.adopt(parent)?;
        Ok(node)
    }

    /// Exclusive access to the wrapped module
    pub async fn module(&self) -> tokio::sync::MutexGuard<'_, Box<dyn Module>> {
        self.module.lock().await
    }

    pub fn parent(&self) -> Option<Arc<ModuleNode>> {
        let _tree = TREE_LOCK.read().unwrap_or_else(PoisonError::into_inner);
        self.links().parent.upgrade()
    }

    pub fn children(&self) -> Vec<Arc<ModuleNode>> {
        let _tree = TREE_LOCK.read().unwrap_or_else(PoisonError::into_inner);
        self.links().children.clone()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Replace the children collection wholesale.
    ///
    /// Incoming children are NOT reparented and outgoing children keep their
    /// parent pointer; pair with [`ModuleNode::adopt`] when both directions
    /// must agree.
    pub fn set_children(&self, children: Vec<Arc<ModuleNode>>) {
        let _tree = TREE_LOCK.write().unwrap_or_else(PoisonError::into_inner);
        self.links().children = children;
    }

    /// Move this node under `new_parent`.
    ///
    /// In one critical section: removes self from the old parent's children
    /// (skipped for a root), points self at `new_parent`, appends self to
    /// `new_parent`'s children exactly once.
    ///
    /// # Errors
    /// - DomainError::CycleDetected if `new_parent` is this node or one of its descendants.
    ///   Nothing is mutated in that case.
    pub fn adopt(self: &Arc<Self>, new_parent: &Arc<Self>) -> Result<()> {
        let _tree = TREE_LOCK.write().unwrap_or_else(PoisonError::into_inner);

        if self.is_ancestor_of(new_parent) {
            return Err(DomainError::CycleDetected);
        }

        let old_parent = self.links().parent.upgrade();
        if let Some(old) = &old_parent {
            old.links().children.retain(|child| !Arc::ptr_eq(child, self));
        }

        self.links().parent = Arc::downgrade(new_parent);

        let mut links = new_parent.links();
        links.children.retain(|child| !Arc::ptr_eq(child, self));
        links.children.push(Arc::clone(self));

        debug!(
            had_parent = old_parent.is_some(),
            siblings = links.children.len() - 1,
            "Node adopted"
        );
        Ok(())
    }

    // Caller holds TREE_LOCK.
    fn is_ancestor_of(self: &Arc<Self>, node: &Arc<Self>) -> bool {
        let mut current = Some(Arc::clone(node));
        while let Some(candidate) = current {
            if Arc::ptr_eq(&candidate, self) {
                return true;
            }
            current = candidate.links().parent.upgrade();
        }
        false
    }

    fn links(&self) -> MutexGuard<'_, Links> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
