#![cfg_attr(not(test), no_std)]

extern crate alloc;

/* tfs 的整体架构，自上而下 */

// 操作层：路径解析、打开、读写、链接等对外接口
mod fs;
pub use fs::{OpenFlag, TinyFileSystem};

// 打开文件表：句柄与读写游标
mod open_file;

// 目录索引层：把根目录的数据块当作目录项数组
mod dir;

// 索引节点表
mod inode_table;

// 数据块分配层
mod block;

// 内存数据结构层：位图、索引节点、定长目录项
mod layout;
pub use layout::InodeKind;

mod error;
pub use error::{Error, Result, SourceError};

mod params;
pub use params::Params;

// 外部字节源接口层：拷入操作从宿主读取数据的接口
mod source;
pub use source::ByteSource;

mod stat;
pub use stat::{Dirent, Stat};

/// 索引节点号
pub type Inumber = u32;
/// 数据块编号
pub type BlockId = u32;
/// 打开文件句柄
pub type Handle = u32;

/// 根目录的索引节点号
pub const ROOT_INUMBER: Inumber = 0;
/// 目录项名字段的字节数，最后一字节留给 \0
pub const MAX_FILE_NAME: usize = 40;
/// 拷入时每次从外部字节源读取的字节数
pub const COPY_CHUNK: usize = 1024;
