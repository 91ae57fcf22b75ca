//! # 目录索引层
//!
//! 扁平命名空间：根目录的数据块被视为 [`DirEntry`] 数组，
//! 空槽位的索引节点号为 -1。删除不做压缩，插入总是复用第一个空槽位。
//!
//! 调用者必须持有目录索引节点的锁。

use alloc::string::String;
use alloc::vec::Vec;

use crate::block::BlockAllocator;
use crate::layout::{DirEntry, Inode};
use crate::{Error, Inumber, Result};

/// 在目录下通过名字获取目录项的索引节点号
pub fn lookup(dir: &Inode, name: &str, blocks: &BlockAllocator) -> Option<Inumber> {
    assert!(dir.is_dir());
    let block = dir.block()?;

    blocks.map(block, |data| {
        slots(dir.size, data).find_map(|entry| entry.inumber().filter(|_| entry.name() == name))
    })
}

pub fn insert(
    dir: &mut Inode,
    name: &str,
    inumber: Inumber,
    blocks: &BlockAllocator,
) -> Result<()> {
    assert!(dir.is_dir());
    if !DirEntry::fits(name) {
        return Err(Error::InvalidPath);
    }

    // 第一次插入时才给目录分配数据块，并把全部槽位置空
    if dir.block().is_none() {
        let block = blocks.alloc()?;
        let capacity = blocks.block_size() / DirEntry::SIZE;
        blocks.map_mut(block, |data| {
            for slot in data.chunks_exact_mut(DirEntry::SIZE).take(capacity) {
                DirEntry::default().write_to(slot);
            }
        });
        dir.set_block(block);
        dir.size = capacity * DirEntry::SIZE;
    }

    let block = dir.block().expect("directory block allocated above");
    let size = dir.size;
    blocks.map_mut(block, |data| {
        let mut free_slot = None;
        for offset in slot_offsets(size) {
            let entry = DirEntry::read_from(&data[offset..]);
            if entry.is_empty() {
                if free_slot.is_none() {
                    free_slot = Some(offset);
                }
            } else if entry.name() == name {
                return Err(Error::DuplicateName);
            }
        }

        let Some(offset) = free_slot else {
            log::warn!("root directory is full");
            return Err(Error::Exhausted);
        };
        DirEntry::new(name, inumber).write_to(&mut data[offset..]);
        Ok(())
    })
}

/// 在目录下通过名字删除目录项并返回其索引节点号
pub fn remove(dir: &mut Inode, name: &str, blocks: &BlockAllocator) -> Result<Inumber> {
    assert!(dir.is_dir());
    let block = dir.block().ok_or(Error::NotFound)?;
    let size = dir.size;

    blocks.map_mut(block, |data| {
        for offset in slot_offsets(size) {
            let entry = DirEntry::read_from(&data[offset..]);
            if let Some(inumber) = entry.inumber().filter(|_| entry.name() == name) {
                DirEntry::default().write_to(&mut data[offset..]);
                return Ok(inumber);
            }
        }
        Err(Error::NotFound)
    })
}

/// 目录下所有有效的目录项，按槽位顺序
pub fn entries(dir: &Inode, blocks: &BlockAllocator) -> Vec<(String, Inumber)> {
    assert!(dir.is_dir());
    let Some(block) = dir.block() else {
        return Vec::new();
    };

    blocks.map(block, |data| {
        slots(dir.size, data)
            .filter_map(|entry| Some((String::from(entry.name()), entry.inumber()?)))
            .collect()
    })
}

fn slot_offsets(size: usize) -> impl Iterator<Item = usize> {
    (0..size).step_by(DirEntry::SIZE)
}

fn slots(size: usize, data: &[u8]) -> impl Iterator<Item = DirEntry> + '_ {
    slot_offsets(size).map(move |offset| DirEntry::read_from(&data[offset..]))
}
