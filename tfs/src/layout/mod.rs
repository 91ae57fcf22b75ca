//! # 内存数据结构层
//!
//! tfs 没有后备设备，所有结构都常驻内存：
//! 分配状态位图 | 索引节点 | 根目录数据块内的定长目录项

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{Inode, InodeKind};

/// 目录项，按定长布局存放在根目录的数据块里
mod dir_entry;
pub use dir_entry::DirEntry;
