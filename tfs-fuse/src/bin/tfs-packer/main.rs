mod cli;

use std::io;

use clap::Parser;
use cli::Cli;
use tfs::TinyFileSystem;

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    println!("source={:?}", cli.source);

    let fs = TinyFileSystem::init(cli.params()).map_err(io::Error::other)?;
    let packed = tfs_fuse::pack(&fs, &cli.source)?;
    for (name, copied) in &packed {
        println!("file: {name:?} ({copied} bytes)");
    }

    for dirent in fs.read_dir() {
        let stat = fs
            .stat(&format!("/{}", dirent.name))
            .map_err(io::Error::other)?;
        log::info!(
            "{:>3} {:?} links={} size={}",
            stat.inumber,
            stat.kind,
            stat.links,
            stat.size
        );
    }
    println!("{} files packed", packed.len());

    fs.destroy().map_err(io::Error::other)
}
