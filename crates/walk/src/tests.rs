use super::*;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::{Path, PathBuf};

use rustix::fs::OFlags;
use test_support::{TempTree, openat2_available};

/// Records every `openat2` request before forwarding it.
struct Recording<F> {
    inner: F,
    opens: RefCell<Vec<(PathBuf, OpenHow)>>,
}

impl<F> Recording<F> {
    fn new(inner: F) -> Self {
        Self {
            inner,
            opens: RefCell::new(Vec::new()),
        }
    }

    fn paths_opened_with(&self, flag: OFlags) -> Vec<PathBuf> {
        self.opens
            .borrow()
            .iter()
            .filter(|(_, how)| how.flags().contains(flag))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl<F: Filesystem> Filesystem for Recording<F> {
    type Stream = F::Stream;

    fn open_root(&self, path: &Path) -> io::Result<OwnedFd> {
        self.inner.open_root(path)
    }

    fn openat2(&self, anchor: BorrowedFd<'_>, path: &Path, how: OpenHow) -> io::Result<OwnedFd> {
        self.opens.borrow_mut().push((path.to_path_buf(), how));
        self.inner.openat2(anchor, path, how)
    }

    fn open_stream(&self, fd: OwnedFd) -> io::Result<Self::Stream> {
        self.inner.open_stream(fd)
    }

    fn stat_at(&self, anchor: BorrowedFd<'_>, name: &OsStr) -> io::Result<EntryKind> {
        self.inner.stat_at(anchor, name)
    }
}

/// Reports every entry as `DT_UNKNOWN`, forcing the metadata fallback.
struct UnknownTypes;

struct UnknownStream(DirStream);

impl AsFd for UnknownStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl DirectoryStream for UnknownStream {
    fn next_entry(&mut self) -> Option<io::Result<DirEntry>> {
        self.0
            .next_entry()
            .map(|entry| entry.map(|entry| entry.with_kind(EntryKind::Unknown)))
    }
}

impl Filesystem for UnknownTypes {
    type Stream = UnknownStream;

    fn open_root(&self, path: &Path) -> io::Result<OwnedFd> {
        SystemFilesystem.open_root(path)
    }

    fn openat2(&self, anchor: BorrowedFd<'_>, path: &Path, how: OpenHow) -> io::Result<OwnedFd> {
        SystemFilesystem.openat2(anchor, path, how)
    }

    fn open_stream(&self, fd: OwnedFd) -> io::Result<UnknownStream> {
        SystemFilesystem.open_stream(fd).map(UnknownStream)
    }

    fn stat_at(&self, anchor: BorrowedFd<'_>, name: &OsStr) -> io::Result<EntryKind> {
        SystemFilesystem.stat_at(anchor, name)
    }
}

fn opened_set<F>(fs: &Recording<F>) -> BTreeSet<(PathBuf, bool)> {
    fs.opens
        .borrow()
        .iter()
        .map(|(path, how)| (path.clone(), how.flags().contains(OFlags::DIRECTORY)))
        .collect()
}

fn nested_tree() -> TempTree {
    let tree = TempTree::new();
    tree.dir("a/b/c")
        .dir("d/e")
        .file("top.txt")
        .file("a/b/inner.txt")
        .file("d/e/leaf.txt");
    tree
}

#[test]
fn walk_visits_every_directory_once() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    let fs = Recording::new(SystemFilesystem);

    let summary = WalkBuilder::new(tree.root())
        .walk_with(&fs)
        .expect("walk succeeds");

    assert_eq!(summary.directories, 5);
    assert_eq!(summary.symlinks, 0);
    assert_eq!(summary.skipped, 3);

    let mut opened = fs.paths_opened_with(OFlags::DIRECTORY);
    opened.sort();
    let expected: Vec<PathBuf> = ["a", "b", "c", "d", "e"].iter().map(PathBuf::from).collect();
    assert_eq!(opened, expected);
}

#[test]
fn walk_of_empty_root_succeeds() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    let summary = WalkBuilder::new(tree.root()).walk().expect("walk succeeds");
    assert_eq!(summary, WalkSummary::default());
}

#[test]
fn directories_are_opened_one_component_at_a_time() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    let fs = Recording::new(SystemFilesystem);

    WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::BENEATH)
        .walk_with(&fs)
        .expect("walk succeeds");

    for path in fs.paths_opened_with(OFlags::DIRECTORY) {
        assert_eq!(path.components().count(), 1, "{}", path.display());
    }
    for (_, how) in fs.opens.borrow().iter() {
        assert_eq!(how.resolve(), ResolveFlags::BENEATH);
    }
}

#[test]
fn symlinks_are_resolved_from_the_root_with_full_paths() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("inner.txt", "a/b/link").symlink("a", "top-link");
    let fs = Recording::new(SystemFilesystem);

    let summary = WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::BENEATH)
        .walk_with(&fs)
        .expect("walk succeeds");
    assert_eq!(summary.symlinks, 2);

    let mut resolved = fs.paths_opened_with(OFlags::PATH);
    resolved.sort();
    assert_eq!(
        resolved,
        vec![PathBuf::from("a/b/link"), PathBuf::from("top-link")]
    );
}

#[test]
fn symlinks_to_directories_are_not_descended() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("a", "alias");

    let summary = WalkBuilder::new(tree.root()).walk().expect("walk succeeds");
    assert_eq!(summary.directories, 5);
    assert_eq!(summary.symlinks, 1);
}

#[test]
fn escaping_symlink_fails_beneath_root() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("../../outside", "a/escape");

    let error = WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::BENEATH)
        .walk()
        .expect_err("escape must be rejected");
    assert_eq!(error.operation(), Operation::OpenSymlink);
    assert_eq!(error.path(), Path::new("a/escape"));
    assert_eq!(error.raw_os_error(), Some(libc::EXDEV));
}

#[test]
fn escaping_symlink_is_accepted_without_constraints() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("../../outside", "a/escape");

    let summary = WalkBuilder::new(tree.root())
        .walk()
        .expect("unconstrained walk succeeds");
    assert_eq!(summary.symlinks, 1);
}

#[test]
fn absolute_symlink_fails_beneath_root() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.symlink(tree.outside(), "abs");

    let error = WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::BENEATH)
        .walk()
        .expect_err("absolute target must be rejected");
    assert_eq!(error.operation(), Operation::OpenSymlink);
    assert_eq!(error.path(), Path::new("abs"));
}

#[test]
fn absolute_symlink_is_scoped_in_root() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir("a").symlink("/a", "abs");

    let summary = WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::IN_ROOT)
        .walk()
        .expect("/a resolves to root/a");
    assert_eq!(summary.symlinks, 1);
}

#[test]
fn no_symlinks_stops_at_first_symlink() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("inner.txt", "a/b/one").symlink("leaf.txt", "d/e/two");
    let fs = Recording::new(SystemFilesystem);

    let error = WalkBuilder::new(tree.root())
        .resolve_flags(ResolveFlags::NO_SYMLINKS)
        .walk_with(&fs)
        .expect_err("symlinks are forbidden");
    assert_eq!(error.operation(), Operation::OpenSymlink);
    assert_eq!(error.raw_os_error(), Some(libc::ELOOP));
    assert_eq!(fs.paths_opened_with(OFlags::PATH), vec![error.path().to_path_buf()]);
}

#[test]
fn dangling_symlink_fails() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.symlink("missing", "dangling");

    let error = WalkBuilder::new(tree.root())
        .walk()
        .expect_err("target does not exist");
    assert_eq!(error.operation(), Operation::OpenSymlink);
    assert_eq!(error.raw_os_error(), Some(libc::ENOENT));
}

#[test]
fn dot_entries_are_never_opened() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("c", "a/b/link");
    let fs = Recording::new(SystemFilesystem);

    WalkBuilder::new(tree.root())
        .walk_with(&fs)
        .expect("walk succeeds");

    for (path, _) in fs.opens.borrow().iter() {
        let last = path.file_name();
        assert!(last.is_some(), "{} ends in a dot entry", path.display());
        assert!(
            path.iter().all(|part| part != "." && part != ".."),
            "{}",
            path.display()
        );
    }
}

#[test]
fn unknown_entry_types_behave_like_reported_types() {
    if !openat2_available() {
        return;
    }
    let tree = nested_tree();
    tree.symlink("inner.txt", "a/b/link").symlink("d", "dir-link");

    let native = Recording::new(SystemFilesystem);
    let native_summary = WalkBuilder::new(tree.root())
        .walk_with(&native)
        .expect("native walk");
    let fallback = Recording::new(UnknownTypes);
    let fallback_summary = WalkBuilder::new(tree.root())
        .walk_with(&fallback)
        .expect("fallback walk");

    assert_eq!(native_summary, fallback_summary);
    assert_eq!(opened_set(&native), opened_set(&fallback));
}

#[test]
fn root_symlink_is_rejected() {
    let tree = TempTree::new();
    tree.dir("real");
    let link = tree.root().join("link-to-real");
    std::os::unix::fs::symlink(tree.root().join("real"), &link).expect("symlink");

    let error = WalkBuilder::new(&link)
        .walk()
        .expect_err("root is opened with O_NOFOLLOW");
    assert_eq!(error.operation(), Operation::OpenRoot);
    assert_eq!(error.path(), link.as_path());
    // O_DIRECTORY wins over O_NOFOLLOW on Linux, so ENOTDIR is the usual code.
    assert!(
        matches!(error.raw_os_error(), Some(libc::ENOTDIR | libc::ELOOP)),
        "{error}"
    );
}

#[test]
fn missing_root_is_reported() {
    let error = WalkBuilder::new("/nonexistent/path/for/walker")
        .walk()
        .expect_err("missing root");
    assert_eq!(error.operation(), Operation::OpenRoot);
    assert_eq!(error.path(), Path::new("/nonexistent/path/for/walker"));
    assert_eq!(error.raw_os_error(), Some(libc::ENOENT));
}

#[test]
fn file_root_is_rejected() {
    let tree = TempTree::new();
    tree.file("plain");
    let error = WalkBuilder::new(tree.root().join("plain"))
        .walk()
        .expect_err("root must be a directory");
    assert_eq!(error.operation(), Operation::OpenRoot);
    assert_eq!(error.raw_os_error(), Some(libc::ENOTDIR));
}

#[test]
fn oversized_symlink_path_fails_before_resolution() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir("deep/er").symlink("x", "deep/er/link");
    let fs = Recording::new(SystemFilesystem);

    let error = WalkBuilder::new(tree.root())
        .path_limits(PathLimits {
            capacity: "deep/er/link".len(),
            max_depth: MAX_DIR_DEPTH,
        })
        .walk_with(&fs)
        .expect_err("path does not fit");
    assert_eq!(error.operation(), Operation::BuildPath);
    assert_eq!(error.path(), Path::new("deep/er/link"));
    assert!(fs.paths_opened_with(OFlags::PATH).is_empty());
}

fn chain(depth: usize) -> String {
    vec!["d"; depth].join("/")
}

#[test]
fn directory_beyond_depth_bound_is_not_opened() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir(&chain(5)).symlink("x", &format!("{}/link", chain(5)));
    let fs = Recording::new(SystemFilesystem);

    let error = WalkBuilder::new(tree.root())
        .path_limits(PathLimits {
            capacity: PATH_MAX,
            max_depth: 3,
        })
        .walk_with(&fs)
        .expect_err("tree is deeper than the bound");
    assert_eq!(error.operation(), Operation::Descend);
    assert_eq!(error.path(), Path::new("d/d/d/d"));
    assert_eq!(error.raw_os_error(), None);
    assert!(matches!(
        error.kind(),
        WalkErrorKind::TooDeep { max: 3, .. }
    ));
    assert_eq!(fs.paths_opened_with(OFlags::DIRECTORY).len(), 3);
    assert!(fs.paths_opened_with(OFlags::PATH).is_empty());
}

#[test]
fn tree_exactly_at_depth_bound_is_walked() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir(&chain(3)).symlink("..", &format!("{}/up", chain(3)));

    let summary = WalkBuilder::new(tree.root())
        .path_limits(PathLimits {
            capacity: PATH_MAX,
            max_depth: 3,
        })
        .walk()
        .expect("depth equals the bound");
    assert_eq!(summary.directories, 3);
    assert_eq!(summary.symlinks, 1);
}

#[test]
fn deep_tree_reports_error_instead_of_overflowing() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir(&chain(200));

    let error = WalkBuilder::new(tree.root())
        .path_limits(PathLimits {
            capacity: PATH_MAX,
            max_depth: 128,
        })
        .walk()
        .expect_err("tree is deeper than the bound");
    assert_eq!(error.operation(), Operation::Descend);
    assert_eq!(error.path().components().count(), 129);
}

#[test]
fn deep_tree_within_default_bound_is_walked() {
    if !openat2_available() {
        return;
    }
    let tree = TempTree::new();
    tree.dir(&chain(500));

    let summary = WalkBuilder::new(tree.root())
        .walk()
        .expect("default bound covers the tree");
    assert_eq!(summary.directories, 500);
}

#[test]
fn stack_size_grows_with_depth_bound() {
    let shallow = PathLimits {
        capacity: PATH_MAX,
        max_depth: 1,
    };
    let default = PathLimits::default();
    assert_eq!(
        stack_size_for(default) - stack_size_for(shallow),
        (MAX_DIR_DEPTH - 1) * STACK_BYTES_PER_LEVEL
    );
    let unbounded = PathLimits {
        capacity: PATH_MAX,
        max_depth: usize::MAX,
    };
    assert_eq!(stack_size_for(unbounded), usize::MAX);
}
