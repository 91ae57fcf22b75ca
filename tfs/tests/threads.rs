use std::thread;

use tfs::{Error, OpenFlag, Params, TinyFileSystem};

fn init(params: Params) -> TinyFileSystem {
    let _ = env_logger::builder().is_test(true).try_init();
    TinyFileSystem::init(params).unwrap()
}

#[test]
fn disjoint_writers() {
    let fs = init(Params::default());

    thread::scope(|s| {
        for i in 0..8u8 {
            let fs = &fs;
            s.spawn(move || {
                let path = format!("/file{i}");
                let handle = fs.open(&path, OpenFlag::CREATE).unwrap();
                for _ in 0..100 {
                    fs.write(handle, &[i]).unwrap();
                }
                fs.close(handle).unwrap();
            });
        }
    });

    for i in 0..8u8 {
        let handle = fs.open(&format!("/file{i}"), OpenFlag::none()).unwrap();
        assert_eq!(fs.read_to_end(handle).unwrap(), [i; 100]);
        fs.close(handle).unwrap();
    }
    assert_eq!(fs.read_dir().len(), 8);
}

#[test]
fn racing_creates_yield_one_inode() {
    let fs = init(Params::default());

    let inumbers = thread::scope(|s| {
        let workers = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let handle = fs.open("/same", OpenFlag::CREATE).unwrap();
                    let inumber = fs.lookup("/same").unwrap();
                    fs.close(handle).unwrap();
                    inumber
                })
            })
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(inumbers.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(fs.read_dir().len(), 1);
    assert_eq!(fs.stat("/same").unwrap().links, 1);
}

#[test]
fn shared_handle_appends_whole_chunks() {
    let fs = init(Params::default());
    let handle = fs.open("/shared", OpenFlag::CREATE).unwrap();

    thread::scope(|s| {
        for byte in [b'a', b'b', b'c', b'd'] {
            let fs = &fs;
            s.spawn(move || {
                for _ in 0..16 {
                    assert_eq!(fs.write(handle, &[byte; 4]), Ok(4));
                }
            });
        }
    });

    fs.close(handle).unwrap();
    let handle = fs.open("/shared", OpenFlag::none()).unwrap();
    let bytes = fs.read_to_end(handle).unwrap();
    fs.close(handle).unwrap();

    // 同一句柄上的写互斥，每次写入的四个字节不会交错
    assert_eq!(bytes.len(), 4 * 16 * 4);
    assert!(bytes.chunks(4).all(|chunk| chunk.iter().all(|&b| b == chunk[0])));
}

#[test]
fn link_churn() {
    let fs = init(Params::default());
    let handle = fs.open("/base", OpenFlag::CREATE).unwrap();
    fs.write(handle, b"base").unwrap();
    fs.close(handle).unwrap();

    thread::scope(|s| {
        for i in 0..4 {
            let fs = &fs;
            s.spawn(move || {
                let name = format!("/link{i}");
                for _ in 0..50 {
                    fs.link("/base", &name).unwrap();
                    fs.unlink(&name).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..50 {
                match fs.open("/base", OpenFlag::none()) {
                    Ok(handle) => {
                        assert_eq!(fs.read_to_end(handle).unwrap(), b"base");
                        fs.close(handle).unwrap();
                    }
                    Err(err) => assert_eq!(err, Error::Exhausted),
                }
            }
        });
    });

    assert_eq!(fs.stat("/base").unwrap().links, 1);
    assert_eq!(fs.read_dir().len(), 1);
}
