//! # 数据块分配层
//!
//! 定长的数据块区域，每块独立加锁；分配状态由位图记录。
//! 回收时不清零，读取总是受索引节点的长度约束。

use alloc::boxed::Box;
use alloc::vec::Vec;

use spin::Mutex;

use crate::layout::Bitmap;
use crate::{BlockId, Error, Result};

type DataBlock = Box<[u8]>;

#[derive(Debug)]
pub struct BlockAllocator {
    state: Mutex<Bitmap>,
    blocks: Vec<Mutex<DataBlock>>,
    block_size: usize,
}

impl BlockAllocator {
    pub fn new(count: usize, block_size: usize) -> Result<Self> {
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(count).map_err(|_| Error::Exhausted)?;
        for _ in 0..count {
            let mut data = Vec::new();
            data.try_reserve_exact(block_size)
                .map_err(|_| Error::Exhausted)?;
            data.resize(block_size, 0);
            blocks.push(Mutex::new(data.into_boxed_slice()));
        }

        Ok(Self {
            state: Mutex::new(Bitmap::new(count)),
            blocks,
            block_size,
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 分配新的数据块并返回其ID
    pub fn alloc(&self) -> Result<BlockId> {
        let Some(id) = self.state.lock().alloc() else {
            log::warn!("data blocks exhausted");
            return Err(Error::Exhausted);
        };
        log::trace!("alloc block {id}");
        Ok(id as BlockId)
    }

    pub fn free(&self, id: BlockId) {
        log::trace!("free block {id}");
        self.state.lock().dealloc(id as usize);
    }

    /// 读取数据块并处理
    pub fn map<V>(&self, id: BlockId, f: impl FnOnce(&[u8]) -> V) -> V {
        f(&self.get(id).lock())
    }

    /// 以某种方式修改数据块
    pub fn map_mut<V>(&self, id: BlockId, f: impl FnOnce(&mut [u8]) -> V) -> V {
        f(&mut self.get(id).lock())
    }

    /// 访问未分配的块是内部错误
    fn get(&self, id: BlockId) -> &Mutex<DataBlock> {
        assert!(
            self.state.lock().is_taken(id as usize),
            "access to unallocated block {id}"
        );
        &self.blocks[id as usize]
    }
}
