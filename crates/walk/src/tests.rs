use std::fs;
use std::path::PathBuf;

use crate::WalkBuilder;

fn collect_paths(root: &std::path::Path, cross: bool) -> Vec<PathBuf> {
    WalkBuilder::new(root)
        .cross_boundaries(cross)
        .build()
        .expect("walker builds")
        .map(|entry| entry.expect("entry readable").path().to_path_buf())
        .collect()
}

#[test]
fn root_is_yielded_first() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("a"), b"x").unwrap();

    let paths = collect_paths(temp.path(), false);
    assert_eq!(paths[0], temp.path());
    assert_eq!(paths.len(), 2);
}

#[test]
fn traversal_is_depth_first_and_sorted() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("b")).unwrap();
    fs::write(root.join("b/inner"), b"x").unwrap();
    fs::write(root.join("a"), b"x").unwrap();
    fs::write(root.join("c"), b"x").unwrap();

    let paths = collect_paths(root, false);
    assert_eq!(
        paths,
        vec![
            root.to_path_buf(),
            root.join("a"),
            root.join("b"),
            root.join("b/inner"),
            root.join("c"),
        ]
    );
}

#[test]
fn file_root_yields_only_itself() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("file");
    fs::write(&file, b"x").unwrap();

    let paths = collect_paths(&file, false);
    assert_eq!(paths, vec![file]);
}

#[test]
fn ordering_is_stable_across_runs() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    for name in ["zz", "aa", "mm"] {
        fs::create_dir(root.join(name)).unwrap();
        fs::write(root.join(name).join("f"), b"x").unwrap();
    }

    let first = collect_paths(root, false);
    let second = collect_paths(root, true);
    // No nested mounts in a tempdir, so the boundary policy cannot change
    // the result; both settings must agree and stay sorted.
    assert_eq!(first, second);
}

#[test]
fn missing_root_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("nope");
    let error = WalkBuilder::new(&missing).build().unwrap_err();
    assert_eq!(error.path(), missing);
    assert_eq!(error.context(), "inspect traversal root");
}

#[test]
fn symlinks_are_yielded_but_not_followed() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("real")).unwrap();
    fs::write(root.join("real/file"), b"x").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

    let paths = collect_paths(root, false);
    #[cfg(unix)]
    {
        assert!(paths.contains(&root.join("link")));
        assert!(!paths.contains(&root.join("link/file")));
    }
    assert!(paths.contains(&root.join("real/file")));
}
