use alloc::string::String;

use crate::{BlockId, MAX_FILE_NAME};

/// 索引节点的类型
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum InodeKind {
    #[default]
    File,
    Directory,
    SoftLink,
}

/// 随类型而定的负载：文件和目录最多拥有一个数据块，软链接只存目标路径
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum InodeData {
    File { block: Option<BlockId> },
    Directory { block: Option<BlockId> },
    SoftLink { target: String },
}

impl Default for InodeData {
    fn default() -> Self {
        Self::File { block: None }
    }
}

#[derive(Debug, Default)]
pub struct Inode {
    pub data: InodeData,
    /// 硬链接个数
    pub links: u32,
    /// 已存放的字节数，不超过块大小
    pub size: usize,
    /// 引用它的打开文件个数
    pub open_count: u32,
}

impl Inode {
    #[inline]
    pub fn init(&mut self, kind: InodeKind) {
        let data = match kind {
            InodeKind::File => InodeData::File { block: None },
            InodeKind::Directory => InodeData::Directory { block: None },
            InodeKind::SoftLink => InodeData::SoftLink {
                target: String::new(),
            },
        };
        *self = Self {
            data,
            links: 1,
            ..Default::default()
        }
    }

    pub fn kind(&self) -> InodeKind {
        match self.data {
            InodeData::File { .. } => InodeKind::File,
            InodeData::Directory { .. } => InodeKind::Directory,
            InodeData::SoftLink { .. } => InodeKind::SoftLink,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind() == InodeKind::Directory
    }

    #[inline]
    pub fn is_soft_link(&self) -> bool {
        self.kind() == InodeKind::SoftLink
    }

    pub fn block(&self) -> Option<BlockId> {
        match self.data {
            InodeData::File { block } | InodeData::Directory { block } => block,
            InodeData::SoftLink { .. } => None,
        }
    }

    pub fn set_block(&mut self, id: BlockId) {
        match &mut self.data {
            InodeData::File { block } | InodeData::Directory { block } => {
                assert!(block.is_none(), "inode already owns a data block");
                *block = Some(id);
            }
            InodeData::SoftLink { .. } => panic!("soft links own no data block"),
        }
    }

    /// 交出数据块的所有权，长度归零
    pub fn take_block(&mut self) -> Option<BlockId> {
        self.size = 0;
        match &mut self.data {
            InodeData::File { block } | InodeData::Directory { block } => block.take(),
            InodeData::SoftLink { .. } => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match &self.data {
            InodeData::SoftLink { target } => Some(target),
            _ => None,
        }
    }

    /// 记录软链接的目标路径，超长部分被截掉
    pub fn set_target(&mut self, path: &str) {
        let InodeData::SoftLink { target } = &mut self.data else {
            panic!("only soft links carry a target path");
        };

        let mut end = path.len().min(MAX_FILE_NAME);
        while !path.is_char_boundary(end) {
            end -= 1;
        }
        target.clear();
        target.push_str(&path[..end]);
    }

    /// 没有名字也没有打开文件引用时才能回收
    #[inline]
    pub fn is_reclaimable(&self) -> bool {
        self.links == 0 && self.open_count == 0
    }
}
