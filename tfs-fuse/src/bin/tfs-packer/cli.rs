use clap::Parser;
use std::path::PathBuf;

use tfs::Params;

#[derive(Parser)]
pub struct Cli {
    /// Directory whose regular files are copied into the file system
    #[arg(long, short)]
    pub source: PathBuf,

    /// Bytes per data block, also the largest file size
    #[arg(long, default_value_t = 1024)]
    pub block_size: usize,

    /// Number of data blocks
    #[arg(long, default_value_t = 1024)]
    pub blocks: usize,

    /// Capacity of the inode table
    #[arg(long, default_value_t = 64)]
    pub inodes: usize,

    /// Maximum number of simultaneously open files
    #[arg(long, default_value_t = 16)]
    pub open_files: usize,
}

impl Cli {
    pub fn params(&self) -> Params {
        Params {
            max_inode_count: self.inodes,
            max_block_count: self.blocks,
            max_open_files_count: self.open_files,
            block_size: self.block_size,
        }
    }
}
