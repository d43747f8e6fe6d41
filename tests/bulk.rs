//! Integration tests for the one-call helpers.

mod common;

use std::fs;

use common::{create_tree, entry_names, expect_err, open_reader};
use zipdir::{BufferedMap, Error};

#[test]
fn test_compress_folder_and_extract_to() {
    let tmp = tempfile::tempdir().unwrap();
    let root = create_tree(
        &tmp.path().join("photos"),
        &[("a.jpg", b"jpeg" as &[u8]), ("2024/b.jpg", b"more jpeg")],
    );

    let zip = zipdir::compress_folder(&root).unwrap();
    assert_eq!(zip.file_name().unwrap(), "photos.zip");
    assert_eq!(zip.parent(), std::path::absolute(tmp.path()).ok().as_deref());

    let out = tmp.path().join("nested/restore");
    assert_eq!(zipdir::extract_to(&zip, &out).unwrap(), 4);
    assert_eq!(fs::read(out.join("photos/2024/b.jpg")).unwrap(), b"more jpeg");
}

#[test]
fn test_extract_defaults_to_archive_parent() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("work");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("notes.txt"), b"notes").unwrap();

    let zip = zipdir::compress_file(src.join("notes.txt")).unwrap();
    assert_eq!(zip.file_name().unwrap(), "notes.txt.zip");
    fs::remove_file(src.join("notes.txt")).unwrap();

    assert_eq!(zipdir::extract(&zip).unwrap(), 1);
    assert_eq!(fs::read(src.join("notes.txt")).unwrap(), b"notes");
}

#[test]
fn test_compress_here_dispatches() {
    let tmp = tempfile::tempdir().unwrap();
    let folder = create_tree(&tmp.path().join("dir"), &[("x", b"x" as &[u8])]);
    let file = tmp.path().join("single.bin");
    fs::write(&file, b"bin").unwrap();

    let folder_zip = zipdir::compress_here(&folder).unwrap();
    assert_eq!(entry_names(&open_reader(&folder_zip)), vec!["dir/", "dir/x"]);

    let file_zip = zipdir::compress_here(&file).unwrap();
    assert_eq!(entry_names(&open_reader(&file_zip)), vec!["single.bin"]);
}

#[test]
fn test_compress_list_skips_missing_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let base = create_tree(
        &tmp.path().join("base"),
        &[("one.txt", b"1" as &[u8]), ("two/three.txt", b"3")],
    );
    let zip = tmp.path().join("list.zip");

    let paths = [base.join("one.txt"), base.join("ghost.txt"), base.join("two")];
    assert_eq!(zipdir::compress_list(&paths, &zip).unwrap(), 3);
    assert_eq!(
        entry_names(&open_reader(&zip)),
        vec!["one.txt", "two/", "two/three.txt"]
    );
}

#[test]
fn test_compress_here_list_names_archive_after_parent() {
    let tmp = tempfile::tempdir().unwrap();
    let base = create_tree(
        &tmp.path().join("album"),
        &[("a.txt", b"a" as &[u8]), ("b.txt", b"b")],
    );

    let zip = zipdir::compress_here_list(&[base.join("a.txt"), base.join("b.txt")]).unwrap();
    assert_eq!(zip, std::path::absolute(base.join("album.zip")).unwrap());
    assert_eq!(entry_names(&open_reader(&zip)), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_compress_buf_and_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    let mut map = BufferedMap::new();
    map.insert("z.txt".into(), b"last".to_vec());
    map.insert("dir/a.txt".into(), b"first".to_vec());

    let zip = tmp.path().join("buf.zip");
    assert_eq!(zipdir::compress_buf(&map, &zip).unwrap(), 2);
    let mut session = open_reader(&zip);
    assert_eq!(entry_names(&session), vec!["dir/a.txt", "z.txt"]);
    assert_eq!(session.extract_all_to_buffer().unwrap(), map);

    let single = tmp.path().join("single.zip");
    zipdir::compress_bytes(b"raw", "raw.bin", &single).unwrap();
    let mut session = open_reader(&single);
    assert_eq!(session.extract_data(0).unwrap(), b"raw");
}

#[test]
fn test_compress_file_to_rejects_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let err = expect_err(zipdir::compress_file_to(tmp.path(), tmp.path().join("x.zip")));
    assert!(matches!(err, Error::OpenFailed { .. }));
    assert!(!tmp.path().join("x.zip").exists());
}

#[test]
fn test_extract_rejects_non_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("fake.zip");
    fs::write(&path, b"plain text").unwrap();
    assert!(!zipdir::is_zip_file(&path));
    assert!(matches!(
        expect_err(zipdir::extract(&path)),
        Error::OpenFailed { .. }
    ));
}
