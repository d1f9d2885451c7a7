// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! The node tree: inodes and tnodes stored in arenas.
//!
//! A [`Tnode`] is a name in the namespace. It carries the stat record and owns
//! exactly one [`Inode`], which holds the content-side state (type, size,
//! reference count, backend, children). Both live in [`slab::Slab`]s and are
//! addressed by stable ids; nodes are only freed through
//! [`NodeTree::remove`] or [`NodeTree::free_inode`], never implicitly.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

use slab::Slab;

use crate::{
    Filesystem, IdAllocator, NodePermission, NodeType, Stat, Timespec, VfsError, VfsResult,
};

/// Index of an [`Inode`] in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InodeId(usize);

/// Index of a [`Tnode`] in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TnodeId(usize);

/// Content node.
pub struct Inode {
    pub node_type: NodeType,
    pub perm: NodePermission,
    pub size: u64,
    /// Number of open handles pinning this inode.
    pub refcount: u32,
    /// Owning backend, `None` for nodes created before anything is mounted.
    pub fs: Option<Filesystem>,
    /// Tnode this inode is mounted on, when it is a backend root.
    pub mountpoint: Option<TnodeId>,
    /// Backend-private identifier.
    pub ident: u64,
    /// Modification time reported by the backend.
    pub time: Timespec,
    /// Children in creation order. Only used by folders.
    pub children: Vec<TnodeId>,
}

impl Inode {
    pub fn new(node_type: NodeType, perm: NodePermission, size: u64) -> Self {
        Self {
            node_type,
            perm,
            size,
            refcount: 0,
            fs: None,
            mountpoint: None,
            ident: 0,
            time: Timespec::default(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.node_type.is_traversable()
    }
}

impl fmt::Debug for Inode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inode")
            .field("node_type", &self.node_type)
            .field("perm", &self.perm)
            .field("size", &self.size)
            .field("refcount", &self.refcount)
            .field("fs", &self.fs.as_ref().map(Filesystem::name))
            .field("ident", &self.ident)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Tree (name) node.
#[derive(Debug)]
pub struct Tnode {
    pub name: String,
    pub st: Stat,
    pub inode: InodeId,
    pub parent: Option<TnodeId>,
}

/// Arena-backed namespace tree rooted at a single root tnode.
pub struct NodeTree {
    inodes: Slab<Inode>,
    tnodes: Slab<Tnode>,
    root: TnodeId,
    ids: Arc<IdAllocator>,
}

impl NodeTree {
    /// Creates a tree holding only the root folder.
    pub fn new(ids: Arc<IdAllocator>) -> Self {
        let mut inodes = Slab::new();
        let mut tnodes = Slab::new();
        let perm = NodePermission::RWX_ALL;
        let inode = InodeId(inodes.insert(Inode::new(NodeType::Directory, perm, 0)));
        let st = Stat {
            dev: ids.new_dev_id(),
            ino: ids.new_ino_id(),
            nlink: 1,
            mode: NodeType::Directory.mode_bits() | perm.bits() as u32,
            ..Default::default()
        };
        let root = TnodeId(tnodes.insert(Tnode {
            name: String::new(),
            st,
            inode,
            parent: None,
        }));
        Self {
            inodes,
            tnodes,
            root,
            ids,
        }
    }

    #[inline]
    pub fn root(&self) -> TnodeId {
        self.root
    }

    #[inline]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn tnode(&self, id: TnodeId) -> &Tnode {
        &self.tnodes[id.0]
    }

    pub fn tnode_mut(&mut self, id: TnodeId) -> &mut Tnode {
        &mut self.tnodes[id.0]
    }

    pub fn inode(&self, id: InodeId) -> &Inode {
        &self.inodes[id.0]
    }

    pub fn inode_mut(&mut self, id: InodeId) -> &mut Inode {
        &mut self.inodes[id.0]
    }

    /// Inode owned by `tnode`.
    pub fn inode_of(&self, tnode: TnodeId) -> &Inode {
        self.inode(self.tnode(tnode).inode)
    }

    pub fn inode_of_mut(&mut self, tnode: TnodeId) -> &mut Inode {
        let inode = self.tnode(tnode).inode;
        self.inode_mut(inode)
    }

    /// Returns `true` if `tnode` still refers to a live node.
    pub fn contains(&self, tnode: TnodeId) -> bool {
        self.tnodes.contains(tnode.0)
    }

    /// Number of live tnodes, root included.
    pub fn len(&self) -> usize {
        self.tnodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tnodes.is_empty()
    }

    /// Allocates an unowned inode. Backends call this from their `mount` and
    /// `open` hooks.
    pub fn alloc_inode(&mut self, inode: Inode) -> InodeId {
        InodeId(self.inodes.insert(inode))
    }

    /// Frees an inode that no tnode owns any more.
    pub fn free_inode(&mut self, id: InodeId) -> Option<Inode> {
        self.inodes.try_remove(id.0)
    }

    /// Replaces the inode owned by `tnode`, returning the previous one.
    pub fn replace_inode(&mut self, tnode: TnodeId, inode: InodeId) -> InodeId {
        core::mem::replace(&mut self.tnode_mut(tnode).inode, inode)
    }

    pub fn parent(&self, tnode: TnodeId) -> Option<TnodeId> {
        self.tnode(tnode).parent
    }

    /// Looks `name` up among the children of folder `dir`.
    pub fn lookup_child(&self, dir: TnodeId, name: &str) -> VfsResult<Option<TnodeId>> {
        let inode = self.inode_of(dir);
        if !inode.is_traversable() {
            return Err(VfsError::NotADirectory);
        }
        Ok(inode
            .children
            .iter()
            .copied()
            .find(|&child| self.tnode(child).name == name))
    }

    /// Links `inode` under folder `dir` as `name`.
    ///
    /// The new tnode inherits the parent's backend and device id and gets a
    /// fresh node id and a link count of one.
    pub fn add_child(&mut self, dir: TnodeId, name: &str, inode: InodeId) -> VfsResult<TnodeId> {
        let parent = self.tnode(dir);
        let dev = parent.st.dev;
        let parent_inode = parent.inode;
        if !self.inode(parent_inode).is_traversable() {
            return Err(VfsError::NotADirectory);
        }
        let parent_fs = self.inode(parent_inode).fs.clone();
        let ino = self.ids.new_ino_id();

        let child_inode = self.inode_mut(inode);
        if child_inode.fs.is_none() {
            child_inode.fs = parent_fs;
        }
        let st = Stat {
            dev,
            ino,
            nlink: 1,
            mode: child_inode.node_type.mode_bits() | child_inode.perm.bits() as u32,
            size: child_inode.size,
            ..Default::default()
        };
        let id = TnodeId(self.tnodes.insert(Tnode {
            name: String::from(name),
            st,
            inode,
            parent: Some(dir),
        }));
        self.inode_mut(parent_inode).children.push(id);
        Ok(id)
    }

    /// Creates a fresh node of `node_type` under `dir`.
    pub fn create_child(
        &mut self,
        dir: TnodeId,
        name: &str,
        node_type: NodeType,
    ) -> VfsResult<TnodeId> {
        let inode = self.alloc_inode(Inode::new(node_type, node_type.default_permission(), 0));
        match self.add_child(dir, name, inode) {
            Ok(tnode) => Ok(tnode),
            Err(err) => {
                self.free_inode(inode);
                Err(err)
            }
        }
    }

    /// Returns `true` if a handle refers to `tnode` or to anything below it.
    pub fn is_pinned(&self, tnode: TnodeId) -> bool {
        let inode = self.inode_of(tnode);
        inode.refcount > 0 || inode.children.iter().any(|&child| self.is_pinned(child))
    }

    /// Topmost node with no links left on the way from `tnode` to the root.
    pub fn unlinked_ancestor(&self, tnode: TnodeId) -> Option<TnodeId> {
        let mut found = None;
        let mut cur = Some(tnode);
        while let Some(node) = cur {
            if self.tnode(node).st.nlink == 0 {
                found = Some(node);
            }
            cur = self.parent(node);
        }
        found
    }

    /// Detaches `tnode` from its parent and frees it together with its inode
    /// and everything below it.
    ///
    /// The root cannot be removed, and neither can a subtree that an open
    /// handle still refers to.
    pub fn remove(&mut self, tnode: TnodeId) -> VfsResult<()> {
        let parent = self.parent(tnode).ok_or(VfsError::Unsupported)?;
        if self.is_pinned(tnode) {
            return Err(VfsError::Unsupported);
        }
        let parent_inode = self.tnode(parent).inode;
        self.inode_mut(parent_inode)
            .children
            .retain(|&child| child != tnode);
        self.free_subtree(tnode);
        Ok(())
    }

    fn free_subtree(&mut self, tnode: TnodeId) {
        let Some(node) = self.tnodes.try_remove(tnode.0) else {
            return;
        };
        if let Some(inode) = self.free_inode(node.inode) {
            for child in inode.children {
                self.free_subtree(child);
            }
        }
    }

    /// Rebuilds the absolute path of `tnode`.
    pub fn path_of(&self, tnode: TnodeId) -> String {
        let mut names = Vec::new();
        let mut cur = tnode;
        while let Some(parent) = self.parent(cur) {
            names.push(self.tnode(cur).name.as_str());
            cur = parent;
        }
        if names.is_empty() {
            return String::from("/");
        }
        let mut path = String::new();
        for name in names.iter().rev() {
            path.push('/');
            path.push_str(name);
        }
        path
    }

    /// Logs the whole tree at debug level.
    pub fn dump(&self) {
        debug!("Dumping VFS nodes:");
        self.dump_from(self.root, 0);
        debug!("Dumping done.");
    }

    fn dump_from(&self, tnode: TnodeId, level: usize) {
        let node = self.tnode(tnode);
        let inode = self.inode(node.inode);
        debug!(
            "{:indent$} {level}: [{}] -> {:?} ({} refs)",
            "",
            node.name,
            node.inode,
            inode.refcount,
            indent = level + 1
        );
        if inode.is_traversable() {
            for &child in &inode.children {
                self.dump_from(child, level + 1);
            }
        }
    }
}

impl fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTree")
            .field("inodes", &self.inodes.len())
            .field("tnodes", &self.tnodes.len())
            .field("root", &self.root)
            .finish()
    }
}
