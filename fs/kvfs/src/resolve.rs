// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Path resolution against the node tree.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{
    NodeTree, NodeType, TnodeId, VfsError, VfsResult,
    path::{self, DOT, DOTDOT},
};

bitflags! {
    /// What [`NodeTree::resolve`] may do with missing components.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CreatePolicy: u8 {
        /// Create missing components: intermediates as folders, the leaf with
        /// the requested type.
        const CREATE = 1 << 0;
        /// Fail with `AlreadyExists` if the leaf is already present.
        const ERR_ON_EXIST = 1 << 1;
    }
}

impl CreatePolicy {
    /// Fail on any missing component.
    pub const NO_CREATE: Self = Self::empty();
}

impl NodeTree {
    /// Resolves `path` to a tnode, walking down from the root.
    ///
    /// Each step scans the children of the current folder linearly. Missing
    /// components are created according to `policy`; `node_type` is only used
    /// for a newly created leaf.
    pub fn resolve(
        &mut self,
        path: &str,
        policy: CreatePolicy,
        node_type: NodeType,
    ) -> VfsResult<TnodeId> {
        if !policy.contains(CreatePolicy::CREATE) {
            let found = self.lookup(path)?;
            if policy.contains(CreatePolicy::ERR_ON_EXIST) {
                return Err(VfsError::AlreadyExists);
            }
            return Ok(found);
        }

        let components: SmallVec<[&str; 8]> = path::components(path).collect();
        let mut cur = self.root();
        let mut created = false;

        for (idx, &name) in components.iter().enumerate() {
            let is_leaf = idx + 1 == components.len();
            if !self.inode_of(cur).is_traversable() {
                return Err(VfsError::NotADirectory);
            }
            cur = match name {
                DOT => cur,
                DOTDOT => {
                    created = false;
                    self.parent(cur).unwrap_or(cur)
                }
                _ => match self.lookup_child(cur, name)? {
                    Some(child) => {
                        created = false;
                        child
                    }
                    None => {
                        let ty = if is_leaf {
                            node_type
                        } else {
                            NodeType::Directory
                        };
                        trace!("VFS: create {name} ({ty:?}) while resolving {path}");
                        created = true;
                        self.create_child(cur, name, ty)?
                    }
                },
            };
        }

        if !created && policy.contains(CreatePolicy::ERR_ON_EXIST) {
            return Err(VfsError::AlreadyExists);
        }
        Ok(cur)
    }

    /// Resolves `path` without creating anything.
    pub fn lookup(&self, path: &str) -> VfsResult<TnodeId> {
        let mut cur = self.root();
        for name in path::components(path) {
            cur = match name {
                DOT => cur,
                DOTDOT => self.parent(cur).unwrap_or(cur),
                _ => self
                    .lookup_child(cur, name)?
                    .ok_or(VfsError::NotFound)?,
            };
        }
        Ok(cur)
    }
}
