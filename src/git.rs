// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Git plumbing for the publish pipeline.
///
/// Obtains a private working copy, stages exactly the written artifact
/// paths, and creates the single commit+push that is the run's only remote
/// mutation. Callers scrub secrets from surfaced messages: git may echo the
/// tokenized remote URL in its stderr.
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command
};

use masterror::AppError;

/// Obtains a fresh working copy of `remote_url` at `path`.
///
/// Destructive precondition: any pre-existing directory at `path` is
/// removed first so every run starts from a clean clone.
///
/// # Errors
///
/// Returns [`AppError`] when the old directory cannot be removed or the
/// clone fails.
pub fn clone_fresh(remote_url: &str, path: &Path) -> Result<(), AppError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            AppError::service(format!(
                "failed to reset working copy at {}: {e}",
                path.display()
            ))
        })?;
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::service(format!(
                "failed to create working copy parent {}: {e}",
                parent.display()
            ))
        })?;
    }

    let destination = path.to_string_lossy();
    let output = Command::new("git")
        .args(["clone", "--quiet", "--depth=1", remote_url, destination.as_ref()])
        .output()
        .map_err(|e| AppError::service(format!("git clone failed to start: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::service(format!(
            "git clone failed: {}",
            stderr.trim()
        )));
    }

    Ok(())
}

/// Configures the commit author identity in the working copy.
///
/// # Errors
///
/// Returns [`AppError`] when git config fails.
pub fn configure_identity(workdir: &Path, name: &str, email: &str) -> Result<(), AppError> {
    run_git(workdir, &["config", "user.name", name])?;
    run_git(workdir, &["config", "user.email", email])
}

/// Stages exactly the given paths, never a blanket stage-all.
///
/// # Errors
///
/// Returns [`AppError`] when git add fails.
pub fn stage(workdir: &Path, paths: &[PathBuf]) -> Result<(), AppError> {
    if paths.is_empty() {
        return Ok(());
    }

    let rendered: Vec<String> = paths
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    let mut args = vec!["add", "--"];
    args.extend(rendered.iter().map(String::as_str));
    run_git(workdir, &args)
}

/// Reports whether anything is staged relative to `HEAD`.
///
/// Byte-identical artifacts stage to an empty diff; the pipeline uses this
/// probe to skip the commit and push entirely on an unchanged repository.
///
/// # Errors
///
/// Returns [`AppError`] when the diff probe cannot run.
pub fn has_staged_changes(workdir: &Path) -> Result<bool, AppError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(["diff", "--cached", "--quiet"])
        .output()
        .map_err(|e| AppError::service(format!("git diff failed to start: {e}")))?;

    Ok(!output.status.success())
}

/// Creates a single commit with the given message.
///
/// # Errors
///
/// Returns [`AppError`] when git commit fails.
pub fn commit(workdir: &Path, message: &str) -> Result<(), AppError> {
    run_git(workdir, &["commit", "--quiet", "-m", message])
}

/// Pushes the current branch to the origin remote.
///
/// # Errors
///
/// Returns [`AppError`] when git push fails.
pub fn push(workdir: &Path) -> Result<(), AppError> {
    run_git(workdir, &["push", "--quiet", "origin", "HEAD"])
}

fn run_git(workdir: &Path, args: &[&str]) -> Result<(), AppError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .map_err(|e| AppError::service(format!("git command failed to start: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::service(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn init_repo(path: &Path) {
        fs::create_dir_all(path).expect("failed to create repo dir");
        let status = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["init", "--quiet"])
            .status()
            .expect("git should be available");
        assert!(status.success());
        configure_identity(path, "fixture", "fixture@example.com")
            .expect("identity configuration failed");
    }

    #[test]
    fn stage_and_commit_cycle_tracks_staged_changes() {
        let temp = tempdir().expect("failed to create tempdir");
        let repo = temp.path().join("repo");
        init_repo(&repo);

        fs::write(repo.join("badge.svg"), "<svg/>").expect("failed to write file");
        stage(&repo, &[PathBuf::from("badge.svg")]).expect("stage failed");
        assert!(has_staged_changes(&repo).expect("probe failed"));

        commit(&repo, "add badge").expect("commit failed");
        assert!(!has_staged_changes(&repo).expect("probe failed"));
    }

    #[test]
    fn restaging_identical_content_leaves_nothing_staged() {
        let temp = tempdir().expect("failed to create tempdir");
        let repo = temp.path().join("repo");
        init_repo(&repo);

        fs::write(repo.join("badge.svg"), "<svg/>").expect("failed to write file");
        stage(&repo, &[PathBuf::from("badge.svg")]).expect("stage failed");
        commit(&repo, "add badge").expect("commit failed");

        fs::write(repo.join("badge.svg"), "<svg/>").expect("failed to rewrite file");
        stage(&repo, &[PathBuf::from("badge.svg")]).expect("stage failed");
        assert!(!has_staged_changes(&repo).expect("probe failed"));
    }

    #[test]
    fn stage_with_no_paths_is_a_no_op() {
        let temp = tempdir().expect("failed to create tempdir");
        let repo = temp.path().join("repo");
        init_repo(&repo);

        stage(&repo, &[]).expect("empty stage should succeed");
        assert!(!has_staged_changes(&repo).expect("probe failed"));
    }

    #[test]
    fn clone_fresh_replaces_existing_directory() {
        let temp = tempdir().expect("failed to create tempdir");
        let source = temp.path().join("source");
        init_repo(&source);
        fs::write(source.join("README.md"), "# fixture\n").expect("failed to write file");
        stage(&source, &[PathBuf::from("README.md")]).expect("stage failed");
        commit(&source, "seed").expect("commit failed");

        let destination = temp.path().join("work");
        fs::create_dir_all(&destination).expect("failed to create stale dir");
        fs::write(destination.join("stale.txt"), "stale").expect("failed to write stale file");

        clone_fresh(&source.to_string_lossy(), &destination).expect("clone failed");

        assert!(destination.join("README.md").exists());
        assert!(!destination.join("stale.txt").exists());
    }

    #[test]
    fn clone_fresh_reports_unreachable_remote() {
        let temp = tempdir().expect("failed to create tempdir");
        let destination = temp.path().join("work");

        let error = clone_fresh("/nonexistent/remote.git", &destination)
            .expect_err("expected clone failure");
        assert!(error.to_string().contains("git clone failed"));
    }
}
