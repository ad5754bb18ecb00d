//! Source branch lookup for registry cache tags
//!
//! The build cache of an app is keyed by the git branch it was built from, so
//! feature branches warm their own cache without evicting the main branch's.

use std::path::Path;

use git2::{ErrorCode, Repository};

/// Cache tag used when the branch cannot be determined
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Branch whose cache is always imported as a fallback
pub const MAIN_BRANCH: &str = "main";

/// Name of the branch checked out in the repository containing `dir`.
///
/// Returns `None` outside a repository or with a detached HEAD. A freshly
/// initialized repository without commits still reports its branch.
pub fn current_branch(dir: &Path) -> Option<String> {
    let repo = Repository::discover(dir).ok()?;
    head_branch(&repo)
}

fn head_branch(repo: &Repository) -> Option<String> {
    match repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().map(str::to_string),
        Ok(_) => None,
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD").ok()?;
            head.symbolic_target()?
                .strip_prefix("refs/heads/")
                .map(str::to_string)
        }
        Err(_) => None,
    }
}

/// Registry cache tag for the branch checked out in `dir`.
///
/// An explicit tag always wins. Characters that are not valid in an image
/// tag are replaced with `-`.
pub fn cache_tag(dir: &Path, explicit: Option<&str>) -> String {
    if let Some(tag) = explicit.filter(|tag| !tag.is_empty()) {
        return tag.to_string();
    }
    current_branch(dir)
        .map(|branch| sanitize_tag(&branch))
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| UNKNOWN_BRANCH.to_string())
}

fn sanitize_tag(branch: &str) -> String {
    branch
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
