//! Tests for GitWorkspace
//!
//! Contains unit tests for the version control adapter

#[cfg(test)]
mod tests {
    use crate::git::{GitWorkspace, VcsError};
    use std::fs;
    use tempfile::TempDir;

    fn setup_repo() -> (TempDir, GitWorkspace) {
        let temp_dir = TempDir::new().unwrap();
        let git = GitWorkspace::init(temp_dir.path()).unwrap();
        (temp_dir, git)
    }

    #[test]
    fn test_init_creates_repository() {
        let (temp_dir, _git) = setup_repo();
        assert!(temp_dir.path().join(".git").is_dir());
    }

    #[test]
    fn test_first_commit_has_no_parent() {
        let (temp_dir, git) = setup_repo();

        fs::write(temp_dir.path().join("README.md"), "# demo\n").unwrap();
        let commit_id = git.commit_all("Initial bootstrap").unwrap();

        assert!(!commit_id.is_empty());
        assert_eq!(git.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_commit_all_stages_modifications_and_deletions() {
        let (temp_dir, git) = setup_repo();

        fs::write(temp_dir.path().join("a.txt"), "one\n").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "two\n").unwrap();
        git.commit_all("add files").unwrap();

        fs::write(temp_dir.path().join("a.txt"), "changed\n").unwrap();
        fs::remove_file(temp_dir.path().join("b.txt")).unwrap();
        git.commit_all("change and delete").unwrap();

        assert_eq!(git.commit_count().unwrap(), 2);

        let diff = git.show_latest();
        assert!(diff.contains("a.txt"));
        assert!(diff.contains("b.txt"));
        assert!(diff.contains("+changed"));
        assert!(diff.contains("-two"));
    }

    #[test]
    fn test_clean_tree_is_nothing_to_commit() {
        let (temp_dir, git) = setup_repo();

        fs::write(temp_dir.path().join("a.txt"), "one\n").unwrap();
        git.commit_all("add file").unwrap();

        let err = git.commit_all("again").unwrap_err();
        assert!(matches!(err, VcsError::NothingToCommit));
        assert_eq!(git.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_show_latest_renders_metadata_and_patch() {
        let (temp_dir, git) = setup_repo();

        fs::write(temp_dir.path().join("hello.txt"), "hello world\n").unwrap();
        let commit_id = git.commit_all("add greeting").unwrap();

        let text = git.show_latest();
        assert!(text.contains(&commit_id));
        assert!(text.contains("add greeting"));
        assert!(text.contains("hello.txt"));
        assert!(text.contains("+hello world"));
    }

    #[test]
    fn test_show_latest_reflects_only_newest_commit() {
        let (temp_dir, git) = setup_repo();

        fs::write(temp_dir.path().join("first.txt"), "first\n").unwrap();
        git.commit_all("first").unwrap();

        fs::write(temp_dir.path().join("second.txt"), "second\n").unwrap();
        git.commit_all("second").unwrap();

        let text = git.show_latest();
        assert!(text.contains("second.txt"));
        assert!(!text.contains("+first\n"));
    }

    #[test]
    fn test_open_existing_repository() {
        let (temp_dir, git) = setup_repo();
        fs::write(temp_dir.path().join("a.txt"), "one\n").unwrap();
        git.commit_all("add file").unwrap();
        drop(git);

        let reopened = GitWorkspace::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_open_missing_repository_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(GitWorkspace::open(temp_dir.path()).is_err());
    }
}
