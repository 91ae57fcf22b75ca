//! # 操作层
//!
//! 对外的类 POSIX 文件操作，组合数据块分配器、索引节点表、目录索引与打开文件表。
//!
//! ## 加锁顺序
//!
//! 根目录索引节点 → 其他索引节点 → 数据块，位图锁只在扫描期间持有；
//! 打开文件槽位 → 索引节点。持有打开文件槽位时从不去锁根目录。
//! 所有命名空间操作在整个“查找 + 修改”期间都持有根目录的锁。

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use enumflags2::{BitFlags, bitflags};
use spin::MutexGuard;

use crate::block::BlockAllocator;
use crate::dir;
use crate::inode_table::InodeTable;
use crate::layout::{DirEntry, Inode, InodeKind};
use crate::open_file::OpenFileTable;
use crate::{
    ByteSource, COPY_CHUNK, Dirent, Error, Handle, Inumber, Params, ROOT_INUMBER, Result, Stat,
};

#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    /// 文件不存在时创建
    CREATE = 0b001,
    /// 先清空文件，再交给用户
    TRUNC  = 0b010,
    /// 游标置于文件末尾
    APPEND = 0b100,
}

impl OpenFlag {
    // enumflags2拒绝值为0的标志
    /// 不带任何标志：文件必须已存在，游标从 0 开始
    #[inline]
    pub fn none() -> BitFlags<OpenFlag> {
        BitFlags::empty()
    }
}

#[derive(Debug)]
pub struct TinyFileSystem {
    params: Params,
    blocks: BlockAllocator,
    inodes: InodeTable,
    open_files: OpenFileTable,
}

impl TinyFileSystem {
    pub fn init(params: Params) -> Result<Self> {
        params.validate()?;

        let fs = Self {
            params,
            blocks: BlockAllocator::new(params.max_block_count, params.block_size)?,
            inodes: InodeTable::new(params.max_inode_count)?,
            open_files: OpenFileTable::new(params.max_open_files_count)?,
        };
        assert_eq!(
            fs.inodes.create(InodeKind::Directory)?,
            ROOT_INUMBER,
            "root directory must be the first inode"
        );

        log::info!("tfs initialized with {params:?}");
        Ok(fs)
    }

    /// 释放全部存储；仍处于打开状态的句柄随之失效
    pub fn destroy(self) -> Result<()> {
        let open = self.open_files.count();
        if open > 0 {
            log::debug!("destroy: {open} files still open");
        }
        log::info!("tfs destroyed");
        Ok(())
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn open(&self, path: &str, flags: impl Into<BitFlags<OpenFlag>>) -> Result<Handle> {
        let flags = flags.into();
        let name = file_name(path)?;
        let mut root = self.root();

        let (inumber, offset) = match dir::lookup(&root, name, &self.blocks) {
            Some(inumber) => {
                let inumber = self.follow(&root, inumber)?;
                let mut inode = self.inode(inumber);
                if flags.contains(OpenFlag::TRUNC) {
                    self.truncate(inumber, &mut inode);
                }
                let offset = if flags.contains(OpenFlag::APPEND) {
                    inode.size
                } else {
                    0
                };
                inode.open_count += 1;
                (inumber, offset)
            }
            None if flags.contains(OpenFlag::CREATE) => {
                let inumber = self.inodes.create(InodeKind::File)?;
                if let Err(err) = dir::insert(&mut root, name, inumber, &self.blocks) {
                    self.inodes.delete(inumber, &self.blocks);
                    log::debug!("open: cannot add {path:?} to the directory: {err}");
                    return Err(err);
                }
                log::debug!("open: created {path:?} as inode {inumber}");
                self.inode(inumber).open_count += 1;
                (inumber, 0)
            }
            None => {
                log::debug!("open: {path:?} not found");
                return Err(Error::NotFound);
            }
        };

        // 句柄分配失败时撤销引用；新建的文件仍留在目录中
        self.open_files
            .add(inumber, offset)
            .inspect_err(|_| self.inode(inumber).open_count -= 1)
    }

    pub fn close(&self, handle: Handle) -> Result<()> {
        let open_file = self.open_files.remove(handle)?;

        let mut inode = self.inode(open_file.inumber);
        inode.open_count -= 1;
        let reclaim = inode.is_reclaimable();
        drop(inode);

        // 最后一个名字早已删除，最后一个句柄负责回收
        if reclaim {
            log::debug!("close: reclaim unlinked inode {}", open_file.inumber);
            self.inodes.delete(open_file.inumber, &self.blocks);
        }
        Ok(())
    }

    /// 从游标处写入`buf`，返回写入的字节数。
    /// 文件最多占一个数据块，超出块末尾的部分被截掉而不报错。
    pub fn write(&self, handle: Handle, buf: &[u8]) -> Result<usize> {
        let mut session = self.open_files.get(handle)?;
        let mut inode = self.inode(session.inumber);

        let offset = session.offset;
        let len = buf
            .len()
            .min(self.params.block_size.saturating_sub(offset));
        if len == 0 {
            return Ok(0);
        }

        let block = match inode.block() {
            Some(block) => block,
            None => {
                let block = self.blocks.alloc()?;
                inode.set_block(block);
                block
            }
        };
        let size = inode.size;
        self.blocks.map_mut(block, |data| {
            // 别的句柄截断过文件时，游标可能越过末尾，中间的空洞补零
            if offset > size {
                data[size..offset].fill(0);
            }
            data[offset..offset + len].copy_from_slice(&buf[..len]);
        });

        session.offset += len;
        inode.size = inode.size.max(session.offset);
        Ok(len)
    }

    /// 从游标处读出数据填充`buf`，到达文件末尾时返回 0
    pub fn read(&self, handle: Handle, buf: &mut [u8]) -> Result<usize> {
        let mut session = self.open_files.get(handle)?;
        let inode = self.inode(session.inumber);

        let offset = session.offset;
        let len = inode.size.saturating_sub(offset).min(buf.len());
        if len == 0 {
            return Ok(0);
        }

        let block = inode
            .block()
            .expect("non-empty file must own a data block");
        self.blocks.map(block, |data| {
            buf[..len].copy_from_slice(&data[offset..offset + len]);
        });

        session.offset += len;
        Ok(len)
    }

    pub fn read_to_end(&self, handle: Handle) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.params.block_size];

        let mut bytes = Vec::new();
        loop {
            let len = self.read(handle, &mut buffer)?;
            if len == 0 {
                break;
            }
            bytes.extend_from_slice(&buffer[..len]);
        }
        Ok(bytes)
    }

    /// 硬链接：新名字指向同一个索引节点
    pub fn link(&self, target: &str, link_name: &str) -> Result<()> {
        let target_name = file_name(target)?;
        let link_name = file_name(link_name)?;
        let mut root = self.root();

        let inumber = dir::lookup(&root, target_name, &self.blocks).ok_or(Error::NotFound)?;
        let mut inode = self.inode(inumber);
        if inode.is_soft_link() {
            log::debug!("link: {target:?} is a soft link");
            return Err(Error::Disallowed);
        }

        dir::insert(&mut root, link_name, inumber, &self.blocks)?;
        inode.links += 1;

        log::debug!("link: {link_name:?} -> inode {inumber}, links={}", inode.links);
        Ok(())
    }

    /// 软链接：新建一个只记录目标路径的索引节点。目标此刻必须存在，之后可以悬空。
    pub fn sym_link(&self, target: &str, link_name: &str) -> Result<()> {
        let target_name = file_name(target)?;
        let link_name = file_name(link_name)?;
        let mut root = self.root();

        dir::lookup(&root, target_name, &self.blocks).ok_or(Error::NotFound)?;

        let inumber = self.inodes.create(InodeKind::SoftLink)?;
        self.inode(inumber).set_target(target);
        if let Err(err) = dir::insert(&mut root, link_name, inumber, &self.blocks) {
            self.inodes.delete(inumber, &self.blocks);
            return Err(err);
        }

        log::debug!("sym_link: {link_name:?} -> {target:?}");
        Ok(())
    }

    pub fn unlink(&self, path: &str) -> Result<()> {
        let name = file_name(path)?;
        let mut root = self.root();

        let inumber = dir::remove(&mut root, name, &self.blocks)?;
        let mut inode = self.inode(inumber);
        let reclaim = match inode.kind() {
            // 软链接不会被多个名字共享
            InodeKind::SoftLink => true,
            InodeKind::File | InodeKind::Directory => {
                inode.links -= 1;
                inode.is_reclaimable()
            }
        };
        let links = inode.links;
        drop(inode);

        log::debug!("unlink: {path:?} (inode {inumber}, links={links})");
        if reclaim {
            self.inodes.delete(inumber, &self.blocks);
        }
        Ok(())
    }

    /// 拷入：从外部字节源读取数据，写入以清空、追加方式打开的`dest_path`
    pub fn copy_from_external<S>(&self, source: &mut S, dest_path: &str) -> Result<usize>
    where
        S: ByteSource + ?Sized,
    {
        let handle = self.open(
            dest_path,
            OpenFlag::CREATE | OpenFlag::TRUNC | OpenFlag::APPEND,
        )?;
        let copied = self.pump(handle, source);
        // 无论成败都要关闭目标文件
        self.close(handle)?;

        log::debug!("copy_from_external: {dest_path:?} {copied:?}");
        copied
    }

    /// 根据路径获取目录项的索引节点号，不跟随软链接
    pub fn lookup(&self, path: &str) -> Result<Inumber> {
        let name = file_name(path)?;
        let root = self.root();
        dir::lookup(&root, name, &self.blocks).ok_or(Error::NotFound)
    }

    /// 路径所指文件的元信息，软链接跟随一层
    pub fn stat(&self, path: &str) -> Result<Stat> {
        let name = file_name(path)?;
        let root = self.root();

        let inumber = dir::lookup(&root, name, &self.blocks).ok_or(Error::NotFound)?;
        let inumber = self.follow(&root, inumber)?;
        let inode = self.inode(inumber);

        Ok(Stat {
            inumber,
            kind: inode.kind(),
            links: inode.links,
            size: inode.size,
        })
    }

    pub fn read_dir(&self) -> Vec<Dirent> {
        let root = self.root();
        dir::entries(&root, &self.blocks)
            .into_iter()
            .map(|(name, inumber)| Dirent {
                kind: self.inode(inumber).kind(),
                name,
                inumber,
            })
            .collect()
    }
}

impl TinyFileSystem {
    fn root(&self) -> MutexGuard<'_, Inode> {
        self.inodes
            .get(ROOT_INUMBER)
            .expect("root directory inode must exist")
    }

    /// 目录项或打开文件引用的索引节点必然存活
    fn inode(&self, inumber: Inumber) -> MutexGuard<'_, Inode> {
        self.inodes
            .get(inumber)
            .unwrap_or_else(|_| panic!("referenced inode {inumber} must exist"))
    }

    /// 软链接只解析一层，指向另一个软链接时拒绝
    fn follow(&self, root: &Inode, inumber: Inumber) -> Result<Inumber> {
        let target = match self.inode(inumber).target() {
            Some(target) => String::from(target),
            None => return Ok(inumber),
        };

        let resolved = file_name(&target)
            .ok()
            .and_then(|name| dir::lookup(root, name, &self.blocks))
            .ok_or_else(|| {
                log::debug!("dangling soft link to {target:?}");
                Error::NotFound
            })?;
        if self.inode(resolved).is_soft_link() {
            return Err(Error::Disallowed);
        }
        Ok(resolved)
    }

    fn truncate(&self, inumber: Inumber, inode: &mut Inode) {
        if let Some(block) = inode.take_block() {
            log::debug!("truncate inode {inumber}");
            self.blocks.free(block);
        }
    }

    fn pump<S>(&self, handle: Handle, source: &mut S) -> Result<usize>
    where
        S: ByteSource + ?Sized,
    {
        let mut buffer = [0u8; COPY_CHUNK];

        let mut copied = 0;
        loop {
            let len = source.read_chunk(&mut buffer)?;
            if len == 0 {
                return Ok(copied);
            }
            let written = self.write(handle, &buffer[..len])?;
            copied += written;
            // 数据块已满，剩余的数据无处可放
            if written < len {
                return Ok(copied);
            }
        }
    }
}

/// 绝对路径去掉开头的`/`即为根目录下的名字
fn file_name(path: &str) -> Result<&str> {
    let name = path
        .strip_prefix('/')
        .filter(|name| !name.is_empty())
        .ok_or(Error::InvalidPath)?;
    if name.contains('/') || !DirEntry::fits(name) {
        return Err(Error::InvalidPath);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_FILE_NAME;

    #[test]
    fn file_name_rules() {
        assert_eq!(file_name("/f1"), Ok("f1"));
        assert_eq!(file_name("f1"), Err(Error::InvalidPath));
        assert_eq!(file_name("/"), Err(Error::InvalidPath));
        assert_eq!(file_name(""), Err(Error::InvalidPath));
        assert_eq!(file_name("/a/b"), Err(Error::InvalidPath));
        assert_eq!(file_name("./unexistent"), Err(Error::InvalidPath));

        let longest = format!("/{}", "n".repeat(MAX_FILE_NAME - 1));
        assert!(file_name(&longest).is_ok());
        let too_long = format!("/{}", "n".repeat(MAX_FILE_NAME));
        assert_eq!(file_name(&too_long), Err(Error::InvalidPath));
    }

    #[test]
    fn root_is_inode_zero() {
        let fs = TinyFileSystem::init(Params::default()).unwrap();
        assert!(fs.root().is_dir());
        assert_eq!(fs.inodes.get(ROOT_INUMBER).unwrap().links, 1);
        assert!(fs.read_dir().is_empty());
    }

    #[test]
    fn init_rejects_bad_params() {
        let params = Params {
            block_size: 8,
            ..Default::default()
        };
        assert!(matches!(
            TinyFileSystem::init(params),
            Err(Error::InvalidParams)
        ));
    }

    #[test]
    fn failed_create_rolls_back_inode() {
        let params = Params {
            max_inode_count: 8,
            block_size: DirEntry::SIZE,
            ..Default::default()
        };
        let fs = TinyFileSystem::init(params).unwrap();
        let handle = fs.open("/a", OpenFlag::CREATE).unwrap();
        fs.close(handle).unwrap();

        // 目录只有一个槽位
        assert_eq!(fs.open("/b", OpenFlag::CREATE), Err(Error::Exhausted));
        // 回滚后的索引节点可被再次分配
        assert_eq!(fs.inodes.create(InodeKind::File), Ok(2));
    }

    #[test]
    fn session_exhaustion_keeps_created_file() {
        let params = Params {
            max_open_files_count: 1,
            ..Default::default()
        };
        let fs = TinyFileSystem::init(params).unwrap();
        let handle = fs.open("/a", OpenFlag::CREATE).unwrap();
        assert_eq!(fs.open("/b", OpenFlag::CREATE), Err(Error::Exhausted));
        assert!(fs.lookup("/b").is_ok());
        assert_eq!(fs.inode(fs.lookup("/b").unwrap()).open_count, 0);
        fs.close(handle).unwrap();
    }
}
