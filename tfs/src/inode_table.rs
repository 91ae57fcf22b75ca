//! # 索引节点表
//!
//! 定长的索引节点数组，每个槽位独立加锁。调用者通过索引节点号借用槽位，
//! 所有权始终留在表中。

use alloc::vec::Vec;

use spin::{Mutex, MutexGuard};

use crate::block::BlockAllocator;
use crate::layout::{Bitmap, Inode, InodeKind};
use crate::{Error, Inumber, Result};

#[derive(Debug)]
pub struct InodeTable {
    state: Mutex<Bitmap>,
    inodes: Vec<Mutex<Inode>>,
}

impl InodeTable {
    pub fn new(count: usize) -> Result<Self> {
        let mut inodes = Vec::new();
        inodes.try_reserve_exact(count).map_err(|_| Error::Exhausted)?;
        inodes.resize_with(count, Default::default);

        Ok(Self {
            state: Mutex::new(Bitmap::new(count)),
            inodes,
        })
    }

    /// 分配新的索引节点并返回其编号
    pub fn create(&self, kind: InodeKind) -> Result<Inumber> {
        let Some(inumber) = self.state.lock().alloc() else {
            log::warn!("inode table exhausted");
            return Err(Error::Exhausted);
        };
        self.inodes[inumber].lock().init(kind);

        log::debug!("create {kind:?} inode {inumber}");
        Ok(inumber as Inumber)
    }

    /// 释放索引节点及其数据块。调用者不能持有该节点的锁。
    pub fn delete(&self, inumber: Inumber, blocks: &BlockAllocator) {
        let mut inode = self.inodes[inumber as usize].lock();
        if let Some(block) = inode.take_block() {
            blocks.free(block);
        }
        *inode = Inode::default();
        self.state.lock().dealloc(inumber as usize);

        log::debug!("delete inode {inumber}");
    }

    /// 凭借编号借用索引节点
    pub fn get(&self, inumber: Inumber) -> Result<MutexGuard<'_, Inode>> {
        if !self.state.lock().is_taken(inumber as usize) {
            return Err(Error::NotFound);
        }
        Ok(self.inodes[inumber as usize].lock())
    }
}
