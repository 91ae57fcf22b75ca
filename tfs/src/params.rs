use crate::layout::DirEntry;
use crate::{Error, Result};

/// 初始化参数，一个文件系统实例的生命周期内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// 索引节点表容量
    pub max_inode_count: usize,
    /// 数据块个数
    pub max_block_count: usize,
    /// 同时打开的文件数上限
    pub max_open_files_count: usize,
    /// 数据块字节数，也是单个文件的最大长度
    pub block_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_inode_count: 64,
            max_block_count: 1024,
            max_open_files_count: 16,
            block_size: 1024,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        let counts = [
            self.max_inode_count,
            self.max_block_count,
            self.max_open_files_count,
        ];
        // 目录项里的索引节点号是 i32，句柄和块号是 u32
        if counts.iter().any(|&n| n == 0 || n > i32::MAX as usize) {
            return Err(Error::InvalidParams);
        }
        // 根目录的数据块至少要放下一个目录项
        if self.block_size < DirEntry::SIZE {
            return Err(Error::InvalidParams);
        }
        Ok(())
    }

    /// 根目录最多能容纳的目录项个数
    #[inline]
    pub fn dir_capacity(&self) -> usize {
        self.block_size / DirEntry::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let params = Params::default();
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.dir_capacity(), 1024 / 44);
    }

    #[test]
    fn rejects_degenerate() {
        let zero_inodes = Params {
            max_inode_count: 0,
            ..Default::default()
        };
        assert_eq!(zero_inodes.validate(), Err(Error::InvalidParams));

        let tiny_blocks = Params {
            block_size: DirEntry::SIZE - 1,
            ..Default::default()
        };
        assert_eq!(tiny_blocks.validate(), Err(Error::InvalidParams));
    }
}
