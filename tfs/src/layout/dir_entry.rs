use crate::{Inumber, MAX_FILE_NAME};

/// 文件系统项的元信息
///
/// 布局：名字 [`MAX_FILE_NAME`] 字节，以 \0 结尾 | 索引节点号 i32 小端，-1 表示空槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    // 最后一字节留给 \0
    name: [u8; MAX_FILE_NAME],
    inumber: i32,
}

impl Default for DirEntry {
    fn default() -> Self {
        Self {
            name: [0; MAX_FILE_NAME],
            inumber: Self::EMPTY,
        }
    }
}

impl DirEntry {
    /// 元信息大小恒为44字节
    pub const SIZE: usize = MAX_FILE_NAME + 4;

    const EMPTY: i32 = -1;

    #[inline]
    pub fn new(name: &str, inumber: Inumber) -> Self {
        assert!(Self::fits(name), "directory entry name too long: {name:?}");
        let bytes = name.as_bytes();
        let mut raw = [0; MAX_FILE_NAME];
        raw[..bytes.len()].copy_from_slice(bytes);

        Self {
            name: raw,
            inumber: inumber as i32,
        }
    }

    /// 名字能否放进目录项
    #[inline]
    pub fn fits(name: &str) -> bool {
        !name.is_empty() && name.len() < MAX_FILE_NAME && !name.contains('\0')
    }

    pub fn name(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(MAX_FILE_NAME);
        core::str::from_utf8(&self.name[..len]).expect("directory entry name must be UTF-8")
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inumber == Self::EMPTY
    }

    #[inline]
    pub fn inumber(&self) -> Option<Inumber> {
        (!self.is_empty()).then_some(self.inumber as Inumber)
    }

    pub fn read_from(bytes: &[u8]) -> Self {
        let (name, inumber) = bytes[..Self::SIZE].split_at(MAX_FILE_NAME);
        Self {
            name: name.try_into().expect("split at MAX_FILE_NAME"),
            inumber: i32::from_le_bytes(inumber.try_into().expect("4 bytes left")),
        }
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        let (name, inumber) = bytes[..Self::SIZE].split_at_mut(MAX_FILE_NAME);
        name.copy_from_slice(&self.name);
        inumber.copy_from_slice(&self.inumber.to_le_bytes());
    }
}
