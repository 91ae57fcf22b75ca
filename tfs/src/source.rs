//! # 外部字节源接口层
//!
//! 拷入操作只要求宿主提供“读出至多 N 个字节、流结束或出错”的能力，
//! 实现了 [`ByteSource`] 的类型即可作为拷入的来源。

use crate::SourceError;

pub trait ByteSource {
    /// 读取数据填充`buf`，返回读到的字节数；0 表示流已结束
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

impl ByteSource for &[u8] {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let len = buf.len().min(self.len());
        let (head, tail) = self.split_at(len);
        buf[..len].copy_from_slice(head);
        *self = tail;
        Ok(len)
    }
}
