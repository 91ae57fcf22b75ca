use alloc::string::String;

use crate::{InodeKind, Inumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub inumber: Inumber,
    pub kind: InodeKind,
    /// 硬链接个数
    pub links: u32,
    /// 文件长度
    pub size: usize,
}

/// 根目录下的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirent {
    pub name: String,
    pub inumber: Inumber,
    pub kind: InodeKind,
}
