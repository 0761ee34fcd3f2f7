//! Git pre-push hook installation.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

const HOOK_SCRIPT: &str = "#!/bin/sh\n# docs-lint pre-push hook\ndocs-lint || exit 1\n";

/// Write `.git/hooks/pre-push` under `root` and make it executable.
pub fn install_pre_push_hook(root: &Path) -> Result<PathBuf> {
    let git_dir = root.join(".git");
    if !git_dir.is_dir() {
        bail!("{} is not a git repository", root.display());
    }

    let hooks_dir = git_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("creating {}", hooks_dir.display()))?;

    let hook_path = hooks_dir.join("pre-push");
    std::fs::write(&hook_path, HOOK_SCRIPT)
        .with_context(|| format!("writing {}", hook_path.display()))?;
    make_executable(&hook_path)?;

    log::debug!("installed hook at {}", hook_path.display());
    Ok(hook_path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn installs_hook() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();

        let path = install_pre_push_hook(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join(".git/hooks/pre-push"));
        let script = fs::read_to_string(&path).unwrap();
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("docs-lint || exit 1"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn refuses_outside_git() {
        let tmp = TempDir::new().unwrap();
        let err = install_pre_push_hook(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }
}
