mod common;

use common::{assert_same_tree, read, write_file};
use copse_core::{copy, copy_with, CopyError, CopyOptions, PermissionControl};
use std::sync::Arc;

#[tokio::test]
async fn copies_a_single_file() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("a.txt");
    let dest = temp.path().join("out/a.txt");
    write_file(&src, b"hello");

    copy(&src, &dest).await.unwrap();
    assert_eq!(read(&dest), b"hello");
}

#[tokio::test]
async fn copies_a_nested_tree() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("src");
    let dest = temp.path().join("dest");
    write_file(src.join("a.txt"), b"one");
    write_file(src.join("sub/b.txt"), b"two");
    write_file(src.join("sub/deeper/c.txt"), b"three");
    std::fs::create_dir(src.join("empty")).unwrap();

    copy(&src, &dest).await.unwrap();
    assert_same_tree(&src, &dest);
}

#[tokio::test]
async fn copy_into_fresh_destination_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("src");
    write_file(src.join("x/y.txt"), b"payload");

    let first = temp.path().join("one");
    let second = temp.path().join("two");
    copy(&src, &first).await.unwrap();
    copy(&src, &second).await.unwrap();
    assert_same_tree(&first, &second);
}

#[tokio::test]
async fn missing_source_reports_not_found_with_path() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("absent");
    let err = copy(&src, temp.path().join("dest")).await.unwrap_err();
    assert!(matches!(err, CopyError::NotFound { .. }));
    assert_eq!(err.path(), Some(src.as_path()));
}

#[tokio::test]
async fn honors_buffer_size_and_sync_options() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("blob");
    let dest = temp.path().join("blob.out");
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write_file(&src, &payload);

    let mut options = CopyOptions::default();
    options.copy_buffer_size = 7;
    options.sync = true;
    copy_with(&src, &dest, options).await.unwrap();
    assert_eq!(read(&dest), payload);
}

#[cfg(unix)]
#[tokio::test]
async fn preserves_file_mode_by_default() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("prog");
    let dest = temp.path().join("prog.out");
    write_file(&src, b"#!/bin/sh\n");
    std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o640)).unwrap();

    copy(&src, &dest).await.unwrap();
    let mode = std::fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[cfg(unix)]
#[tokio::test]
async fn add_mode_ors_bits_onto_the_source_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("f");
    let dest = temp.path().join("f.out");
    write_file(&src, b"x");
    std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o640)).unwrap();

    let mut options = CopyOptions::default();
    options.permission_control = PermissionControl::AddMode(0o111);
    copy_with(&src, &dest, options).await.unwrap();
    let mode = std::fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o751);
}

#[cfg(unix)]
#[tokio::test]
async fn restrictive_directory_mode_is_applied_after_children() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("locked");
    write_file(src.join("inner.txt"), b"data");
    std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o500)).unwrap();

    let dest = temp.path().join("locked.out");
    copy(&src, &dest).await.unwrap();

    let mode = std::fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o500);
    assert_eq!(read(dest.join("inner.txt")), b"data");

    // allow cleanup
    std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn preserve_times_copies_mtime() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("old.txt");
    let dest = temp.path().join("old.out");
    write_file(&src, b"aged");
    let mtime = filetime::FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&src, mtime).unwrap();

    let mut options = CopyOptions::default();
    options.preserve_times = true;
    copy_with(&src, &dest, options).await.unwrap();

    let copied = filetime::FileTime::from_last_modification_time(&std::fs::metadata(&dest).unwrap());
    assert_eq!(copied.unix_seconds(), 1_000_000_000);
}

#[tokio::test]
async fn rename_hook_remaps_destination_paths() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("src");
    let dest = temp.path().join("dest");
    write_file(src.join("config.toml"), b"[x]");
    write_file(src.join("data.bin"), b"\x00\x01");

    let mut options = CopyOptions::default();
    options.rename_destination = Some(Arc::new(|_src, dest| {
        if dest.file_name().is_some_and(|n| n == "config.toml") {
            Ok(dest.with_file_name("config.example.toml"))
        } else {
            Ok(dest.to_path_buf())
        }
    }));
    copy_with(&src, &dest, options).await.unwrap();

    assert_eq!(read(dest.join("config.example.toml")), b"[x]");
    assert_eq!(read(dest.join("data.bin")), b"\x00\x01");
    assert!(!dest.join("config.toml").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn recreates_named_pipes_structurally() {
    use std::os::unix::fs::FileTypeExt;
    use std::process::Command;

    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("src");
    std::fs::create_dir(&src).unwrap();
    let status = Command::new("mkfifo")
        .arg(src.join("pipe"))
        .status()
        .unwrap();
    assert!(status.success());
    write_file(src.join("file.txt"), b"beside the pipe");

    let dest = temp.path().join("dest");
    copy(&src, &dest).await.unwrap();

    let ft = std::fs::symlink_metadata(dest.join("pipe")).unwrap().file_type();
    assert!(ft.is_fifo());
    assert_eq!(read(dest.join("file.txt")), b"beside the pipe");
}
