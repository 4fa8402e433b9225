//! Core GitWorkspace implementation
//!
//! Contains the GitWorkspace struct and its repository operations

use chrono::DateTime;
use git2::{DiffFormat, DiffOptions, ErrorCode, IndexAddOption, Repository, Signature};
use std::path::Path;

use crate::git::types::VcsError;

/// Commit identity used for every commit the server makes.
const COMMIT_AUTHOR: &str = "atelier";
const COMMIT_EMAIL: &str = "agent@atelier.local";

/// Version control adapter for one workspace directory.
pub struct GitWorkspace {
    repo: Repository,
}

impl GitWorkspace {
    /// Initialize an empty repository at `path`.
    ///
    /// Not idempotent: callers invoke this exactly once per new workspace,
    /// immediately after the directory is created.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self, VcsError> {
        let repo = Repository::init(path)?;
        Ok(Self { repo })
    }

    /// Open the existing repository at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VcsError> {
        let repo = Repository::open(path)?;
        Ok(Self { repo })
    }

    /// Stage every working-tree change (additions, modifications,
    /// deletions) and commit it with `message`. Returns the new commit id.
    ///
    /// Fails with `NothingToCommit` when the staged tree equals HEAD's
    /// tree. The first commit on an unborn branch has no parent and is
    /// never "nothing": an empty tree still commits.
    pub fn commit_all(&self, message: &str) -> Result<String, VcsError> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Err(VcsError::NothingToCommit);
            }
        }

        let parents: Vec<_> = parent.iter().collect();
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        log::debug!("Committed {} ({})", oid, message);
        Ok(oid.to_string())
    }

    /// Textual rendering of the most recent commit: metadata header plus
    /// the full patch against its first parent (`git show` shaped).
    ///
    /// Best-effort by contract: any failure here yields an empty string so
    /// a successful commit is never failed retroactively by diff
    /// rendering.
    pub fn show_latest(&self) -> String {
        match self.render_head_commit() {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to render latest commit: {}", e);
                String::new()
            }
        }
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> Result<usize, VcsError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn signature(&self) -> Result<Signature<'static>, VcsError> {
        Ok(Signature::now(COMMIT_AUTHOR, COMMIT_EMAIL)?)
    }

    fn render_head_commit(&self) -> Result<String, VcsError> {
        let commit = self.repo.head()?.peel_to_commit()?;
        let author = commit.author();

        let date = DateTime::from_timestamp(commit.time().seconds(), 0)
            .map(|d| d.format("%a %b %e %H:%M:%S %Y +0000").to_string())
            .unwrap_or_default();

        let mut text = format!(
            "commit {}\nAuthor: {} <{}>\nDate:   {}\n\n",
            commit.id(),
            author.name().unwrap_or(""),
            author.email().unwrap_or(""),
            date
        );
        for line in commit.message().unwrap_or("").lines() {
            text.push_str("    ");
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');

        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let diff = self.repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit.tree()?),
            Some(&mut DiffOptions::new()),
        )?;

        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
            true
        })?;

        Ok(text)
    }
}
