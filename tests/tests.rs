use platform_io::{
    close, create_dir, create_dir_all, create_pipe, delete_dir_contents, delete_dir_tree,
    delete_file, file_exists, open_readable, open_writable, read, read_at, seek, size, tell,
    truncate, write, Error, FileHandle, MappedRegion, PlatformPath, TemporaryDir,
};
use std::io::SeekFrom;

fn tmpdir() -> TemporaryDir {
    TemporaryDir::new("platform-io-test-")
        .expect("expected to be able to create a temporary directory")
}

/// Create a file under `dir` holding `contents`, returning its path.
fn make_file(dir: &TemporaryDir, name: &str, contents: &[u8]) -> anyhow::Result<PlatformPath> {
    let path = dir.path().join(name)?;
    let fd = open_writable(&path, true, true, false)?;
    write(fd, contents)?;
    close(fd)?;
    Ok(path)
}

#[test]
fn write_then_read_back() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "data.bin", b"XYZHello, world!XYZ")?;

    let fd = open_readable(&path)?;
    assert_eq!(size(fd)?, 19);

    // A request larger than the file returns what's there; that's
    // end-of-stream, not an error.
    let mut buf = vec![0_u8; 64];
    assert_eq!(read(fd, &mut buf)?, 19);
    assert_eq!(&buf[..19], b"XYZHello, world!XYZ");

    // The stream is exhausted now.
    assert_eq!(read(fd, &mut buf)?, 0);

    close(fd)?;
    Ok(())
}

#[test]
fn read_at_leaves_the_cursor_alone() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "data.bin", b"XYZHello, world!")?;

    let fd = open_readable(&path)?;
    let mut buf = vec![0_u8; 13];
    assert_eq!(read_at(fd, &mut buf, 3)?, 13);
    assert_eq!(&buf, b"Hello, world!");
    assert_eq!(tell(fd)?, 0);

    // Reading at end-of-file is a zero-byte end-of-stream, not an error.
    assert_eq!(read_at(fd, &mut buf, 1000)?, 0);

    // A sequential read still starts at the beginning.
    let mut head = vec![0_u8; 3];
    assert_eq!(read(fd, &mut head)?, 3);
    assert_eq!(&head, b"XYZ");

    close(fd)?;
    Ok(())
}

#[test]
fn append_repositions_to_end_of_file() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "log.txt", b"first")?;

    // Opening for append must leave the position at end-of-file even where
    // the OS append flag wouldn't.
    let fd = open_writable(&path, true, false, true)?;
    assert_eq!(tell(fd)?, 5);
    write(fd, b" second")?;
    close(fd)?;

    let fd = open_readable(&path)?;
    let mut buf = vec![0_u8; 32];
    let n = read(fd, &mut buf)?;
    assert_eq!(&buf[..n], b"first second");
    close(fd)?;
    Ok(())
}

#[test]
fn opening_a_directory_for_reading_fails() -> anyhow::Result<()> {
    let dir = tmpdir();
    let err = open_readable(dir.path()).unwrap_err();
    match &err {
        Error::Io(_) => {}
        other => panic!("expected an I/O error, got {:?}", other),
    }
    #[cfg(unix)]
    assert!(err.to_string().contains("is a directory"), "{}", err);
    Ok(())
}

#[test]
fn opening_a_missing_file_names_it_in_the_error() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = dir.path().join("no-such-file")?;
    let err = open_readable(&path).unwrap_err();
    assert!(err.to_string().contains("no-such-file"), "{}", err);
    Ok(())
}

#[test]
fn truncate_and_extend() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "data.bin", b"0123456789")?;

    let fd = open_writable(&path, false, false, false)?;
    truncate(fd, 4)?;
    assert_eq!(size(fd)?, 4);
    truncate(fd, 8)?;
    assert_eq!(size(fd)?, 8);

    // The extension reads back as zeros.
    let mut buf = vec![0xa0_u8; 8];
    assert_eq!(read_at(fd, &mut buf, 0)?, 8);
    assert_eq!(&buf, b"0123\0\0\0\0");

    close(fd)?;
    Ok(())
}

#[test]
fn seek_and_tell() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "data.bin", b"0123456789")?;

    let fd = open_readable(&path)?;
    assert_eq!(seek(fd, SeekFrom::Start(4))?, 4);
    assert_eq!(tell(fd)?, 4);
    assert_eq!(seek(fd, SeekFrom::Current(2))?, 6);
    assert_eq!(seek(fd, SeekFrom::End(-1))?, 9);

    let mut buf = [0_u8; 1];
    assert_eq!(read(fd, &mut buf)?, 1);
    assert_eq!(&buf, b"9");

    close(fd)?;
    Ok(())
}

#[test]
fn size_of_an_empty_file_is_zero() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "empty", b"")?;
    let fd = open_readable(&path)?;
    assert_eq!(size(fd)?, 0);
    close(fd)?;
    Ok(())
}

#[test]
fn size_of_a_pipe_is_an_error_not_zero() -> anyhow::Result<()> {
    // A pipe reports a zero st_size no matter what it carries; the
    // position probe turns that into an error instead of a bogus zero.
    let (read_end, write_end) = create_pipe()?;
    assert!(size(read_end).is_err());
    close(read_end)?;
    close(write_end)?;
    Ok(())
}

#[test]
fn pipe_read_sees_end_of_stream_after_writer_closes() -> anyhow::Result<()> {
    let (read_end, write_end) = create_pipe()?;
    write(write_end, b"ping")?;
    close(write_end)?;

    let mut buf = vec![0_u8; 16];
    assert_eq!(read(read_end, &mut buf)?, 4);
    assert_eq!(&buf[..4], b"ping");
    assert_eq!(read(read_end, &mut buf)?, 0);

    close(read_end)?;
    Ok(())
}

#[test]
fn remap_grows_a_mapping_and_writes_are_durable() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "mapped.bin", &[b'a'; 100])?;

    let fd = open_writable(&path, false, false, false)?;
    let mut region = MappedRegion::map(fd, 100)?;
    assert_eq!(region.len(), 100);
    unsafe {
        region.as_mut_slice()[0] = b'A';
    }

    // Grow. The old region is consumed; only the new one may be used.
    let mut region = region.remap(200)?;
    assert_eq!(region.len(), 200);
    assert_eq!(size(fd)?, 200);

    unsafe {
        // Content from before the resize survives.
        assert_eq!(region.as_slice()[0], b'A');
        assert_eq!(region.as_slice()[99], b'a');
        // Writes into the appended range stick.
        region.as_mut_slice()[100..200].fill(b'b');
    }
    region.flush()?;
    region.unmap()?;
    close(fd)?;

    let fd = open_readable(&path)?;
    let mut buf = vec![0_u8; 200];
    assert_eq!(read(fd, &mut buf)?, 200);
    assert_eq!(buf[0], b'A');
    assert!(buf[1..100].iter().all(|&b| b == b'a'));
    assert!(buf[100..].iter().all(|&b| b == b'b'));
    close(fd)?;
    Ok(())
}

#[test]
fn remap_can_shrink() -> anyhow::Result<()> {
    let dir = tmpdir();
    let path = make_file(&dir, "mapped.bin", &[b'x'; 256])?;

    let fd = open_writable(&path, false, false, false)?;
    let region = MappedRegion::map(fd, 256)?;
    let region = region.remap(64)?;
    assert_eq!(region.len(), 64);
    assert_eq!(size(fd)?, 64);
    region.unmap()?;
    close(fd)?;
    Ok(())
}

#[cfg(unix)]
mod signals {
    use super::*;
    use platform_io::{get_signal_handler, set_signal_handler, Disposition, SignalHandler};
    use std::sync::atomic::{AtomicBool, Ordering};

    static CAUGHT: AtomicBool = AtomicBool::new(false);

    extern "C" fn note_signal(_signum: libc::c_int) {
        CAUGHT.store(true, Ordering::SeqCst);
    }

    #[test]
    fn get_set_restore_round_trip() -> anyhow::Result<()> {
        let signum = libc::SIGUSR1;

        let original = get_signal_handler(signum)?;
        assert_eq!(original.disposition(), Disposition::Default);

        let previous = set_signal_handler(signum, &SignalHandler::ignore())?;
        assert_eq!(previous.disposition(), Disposition::Default);
        assert_eq!(get_signal_handler(signum)?.disposition(), Disposition::Ignore);

        // Restoring the descriptor from the first query puts the registry
        // back in its original state.
        let previous = set_signal_handler(signum, &original)?;
        assert_eq!(previous.disposition(), Disposition::Ignore);
        assert_eq!(
            get_signal_handler(signum)?.disposition(),
            original.disposition()
        );
        Ok(())
    }

    #[test]
    fn installed_handler_runs_on_delivery() -> anyhow::Result<()> {
        let signum = libc::SIGUSR2;

        let original = set_signal_handler(signum, &SignalHandler::new(note_signal))?;
        assert_eq!(
            get_signal_handler(signum)?.disposition(),
            Disposition::Handler(note_signal)
        );

        unsafe { libc::raise(signum) };
        assert!(CAUGHT.load(Ordering::SeqCst));

        set_signal_handler(signum, &original)?;
        Ok(())
    }

    #[test]
    fn bogus_signal_number_reports_the_os_error() {
        let err = get_signal_handler(-1).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("sigaction"), "{}", err);
    }
}

#[test]
fn directory_operations() -> anyhow::Result<()> {
    let dir = tmpdir();
    let sub = dir.path().join("sub")?;

    assert!(!file_exists(&sub)?);
    assert!(create_dir(&sub)?);
    assert!(!create_dir(&sub)?);
    assert!(file_exists(&sub)?);

    let deep = sub.join("a")?.join("b")?;
    assert!(create_dir_all(&deep)?);
    assert!(!create_dir_all(&deep)?);

    // Deleting contents keeps the directory itself.
    let stray = make_file(&dir, "stray.txt", b"x")?;
    assert!(delete_dir_contents(dir.path())?);
    assert!(file_exists(dir.path())?);
    assert!(!file_exists(&sub)?);
    assert!(!file_exists(&stray)?);

    // Deleting something that isn't there reports false, not an error.
    assert!(!delete_dir_tree(&sub)?);
    assert!(!delete_file(&stray)?);
    Ok(())
}

#[test]
fn delete_refuses_the_wrong_kind() -> anyhow::Result<()> {
    let dir = tmpdir();
    let file = make_file(&dir, "plain.txt", b"data")?;
    let sub = dir.path().join("sub")?;
    create_dir(&sub)?;

    assert!(delete_file(&sub).is_err());
    assert!(delete_dir_tree(&file).is_err());
    assert!(delete_dir_contents(&file).is_err());

    // The guards left everything in place.
    assert!(file_exists(&file)?);
    assert!(file_exists(&sub)?);
    Ok(())
}

#[test]
fn temporary_dir_is_deleted_on_drop() -> anyhow::Result<()> {
    let kept_path;
    {
        let dir = tmpdir();
        kept_path = dir.path().clone();
        assert!(file_exists(&kept_path)?);
        make_file(&dir, "inside.txt", b"x")?;
    }
    assert!(!file_exists(&kept_path)?);
    Ok(())
}

#[test]
fn file_handle_is_a_plain_value() {
    // Copying the wrapper doesn't duplicate or take over the description.
    fn assert_copy<T: Copy>() {}
    assert_copy::<FileHandle>();
}
