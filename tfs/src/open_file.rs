//! # 打开文件表
//!
//! 每个句柄对应一个槽位，槽位的锁同时串行化同一句柄上的读写。

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

use crate::layout::Bitmap;
use crate::{Error, Handle, Inumber, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFile {
    pub inumber: Inumber,
    /// **文件**内的偏移量
    pub offset: usize,
}

#[derive(Debug)]
pub struct OpenFileTable {
    state: Mutex<Bitmap>,
    entries: Vec<Mutex<Option<OpenFile>>>,
}

/// 对一个打开文件的独占访问，持有期间同一句柄上的其他读写都会等待
pub struct Session<'a>(MutexGuard<'a, Option<OpenFile>>);

impl OpenFileTable {
    pub fn new(count: usize) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(count).map_err(|_| Error::Exhausted)?;
        entries.resize_with(count, Default::default);

        Ok(Self {
            state: Mutex::new(Bitmap::new(count)),
            entries,
        })
    }

    pub fn add(&self, inumber: Inumber, offset: usize) -> Result<Handle> {
        let Some(handle) = self.state.lock().alloc() else {
            log::warn!("open file table exhausted");
            return Err(Error::Exhausted);
        };
        *self.entries[handle].lock() = Some(OpenFile { inumber, offset });

        Ok(handle as Handle)
    }

    /// 关闭句柄并交还会话内容；会等待该句柄上进行中的读写
    pub fn remove(&self, handle: Handle) -> Result<OpenFile> {
        let mut entry = self
            .entries
            .get(handle as usize)
            .ok_or(Error::InvalidHandle)?
            .lock();
        let open_file = entry.take().ok_or(Error::InvalidHandle)?;
        self.state.lock().dealloc(handle as usize);

        Ok(open_file)
    }

    pub fn get(&self, handle: Handle) -> Result<Session<'_>> {
        let entry = self
            .entries
            .get(handle as usize)
            .ok_or(Error::InvalidHandle)?
            .lock();
        if entry.is_none() {
            return Err(Error::InvalidHandle);
        }

        Ok(Session(entry))
    }

    /// 当前打开的句柄个数
    pub fn count(&self) -> usize {
        self.state.lock().taken()
    }
}

impl Deref for Session<'_> {
    type Target = OpenFile;

    fn deref(&self) -> &OpenFile {
        self.0.as_ref().expect("session checked on creation")
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut OpenFile {
        self.0.as_mut().expect("session checked on creation")
    }
}
