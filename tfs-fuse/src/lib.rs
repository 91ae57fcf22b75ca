
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use tfs::{ByteSource, SourceError, TinyFileSystem};

/// 宿主文件作为拷入的字节源
#[derive(Debug)]
pub struct HostFile(pub File);

impl HostFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        File::open(path).map(Self).map_err(|err| source_error(&err))
    }
}

impl ByteSource for HostFile {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        read_retrying(&mut self.0, buf)
    }
}

/// 被信号打断的读取直接重试，其余错误交给调用者
fn read_retrying(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, SourceError> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => return result.map_err(|err| source_error(&err)),
        }
    }
}

fn source_error(err: &io::Error) -> SourceError {
    match err.kind() {
        ErrorKind::NotFound => SourceError::NotFound,
        ErrorKind::PermissionDenied => SourceError::PermissionDenied,
        ErrorKind::Interrupted => SourceError::Interrupted,
        _ => SourceError::Other,
    }
}

/// 把宿主文件拷入文件系统，返回写入的字节数
pub fn copy_from_host(
    fs: &TinyFileSystem,
    host_path: impl AsRef<Path>,
    dest_path: &str,
) -> tfs::Result<usize> {
    let host_path = host_path.as_ref();
    let mut source = HostFile::open(host_path)?;
    let copied = fs.copy_from_external(&mut source, dest_path)?;

    log::info!("copied {host_path:?} into {dest_path:?} ({copied} bytes)");
    Ok(copied)
}

/// 把宿主目录下的普通文件逐个拷入根目录，返回拷入的文件名及字节数。
/// 名字放不进目录项的文件被跳过。
pub fn pack(
    fs: &TinyFileSystem,
    source_dir: impl AsRef<Path>,
) -> io::Result<Vec<(String, usize)>> {
    let mut packed = Vec::new();

    let mut entries = std::fs::read_dir(source_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("skip non-UTF-8 file name {:?}", entry.file_name());
            continue;
        };

        match copy_from_host(fs, entry.path(), &format!("/{name}")) {
            Ok(copied) => packed.push((name, copied)),
            Err(tfs::Error::InvalidPath) => log::warn!("skip {name:?}: name too long"),
            Err(err) => return Err(io::Error::other(err)),
        }
    }

    Ok(packed)
}
