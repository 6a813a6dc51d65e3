use runtime::digest::{expand, file_digest};
use std::fs;

#[test]
fn digest_of_known_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc.bin");
    fs::write(&path, b"abc").unwrap();
    assert_eq!(
        file_digest(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(file_digest(&dir.path().join("gone.jpg")).is_err());
}

#[test]
fn directories_expand_to_reference_images() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["li_si.png", "zhang_san.jpg", "notes.txt"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }
    let loose = dir.path().join("notes.txt");
    let files = expand(&[dir.path().to_path_buf(), loose.clone()]).unwrap();
    assert_eq!(
        files,
        vec![dir.path().join("li_si.png"), dir.path().join("zhang_san.jpg"), loose]
    );
}
