// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Attaching backends to folders of the tree.

use crate::{Filesystem, InodeId, NodeTree, NodeType, TnodeId, VfsError, VfsResult};

impl NodeTree {
    /// Mounts `fs` on the folder at `target`.
    ///
    /// Disk-backed backends need `device` to name a block-device node. The
    /// target must be an existing, empty folder that no handle pins. On
    /// success the target's inode is replaced by the backend root and the
    /// target gets a fresh device id.
    pub fn mount(
        &mut self,
        fs: &Filesystem,
        device: Option<&str>,
        target: &str,
    ) -> VfsResult<TnodeId> {
        let device = if fs.is_temporary() {
            None
        } else {
            Some(self.block_device(device)?)
        };
        let target_node = self.mount_target(target)?;

        let root = fs.mount(self, device)?;
        let inode = self.inode_mut(root);
        inode.fs = Some(fs.clone());
        inode.mountpoint = Some(target_node);
        let (mode, size) = (inode.node_type.mode_bits() | inode.perm.bits() as u32, inode.size);

        let old = self.replace_inode(target_node, root);
        self.free_inode(old);

        let dev = self.ids().new_dev_id();
        let st = &mut self.tnode_mut(target_node).st;
        st.dev = dev;
        st.mode = mode;
        st.size = size;

        info!(
            "VFS: mounted {} on {target} (device {:?})",
            fs.name(),
            device
        );
        Ok(target_node)
    }

    fn block_device(&self, device: Option<&str>) -> VfsResult<InodeId> {
        let path = device.ok_or(VfsError::DeviceNotFound)?;
        let tnode = self.lookup(path).map_err(|_| {
            error!("VFS: mount device {path} not found");
            VfsError::DeviceNotFound
        })?;
        let inode = self.tnode(tnode).inode;
        if self.inode(inode).node_type != NodeType::BlockDevice {
            error!("VFS: mount device {path} is not a block device");
            return Err(VfsError::NotABlockDevice);
        }
        Ok(inode)
    }

    fn mount_target(&self, target: &str) -> VfsResult<TnodeId> {
        let tnode = self.lookup(target).map_err(|_| {
            error!("VFS: mount target {target} not found");
            VfsError::MountTargetInvalid
        })?;
        let inode = self.inode_of(tnode);
        if !inode.is_traversable() || !inode.children.is_empty() || inode.refcount > 0 {
            error!("VFS: mount target {target} is not an empty, unused folder");
            return Err(VfsError::MountTargetInvalid);
        }
        Ok(tnode)
    }
}
