/*
[INPUT]:  Credential file path and bearer token
[OUTPUT]: Persisted token that survives restarts
[POS]:    Auth layer - persistent client-side credential storage
[UPDATE]: When credential file format or location conventions change
*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stores the bearer token in a single file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted token, `None` when nothing is stored
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Persist the token, readable by the owner only
    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&temp_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }

        fs::rename(&temp_path, &self.path)
    }

    /// Remove the persisted token; a missing file is not an error
    pub fn erase(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("taskdeck-test-{}", Uuid::new_v4()));
        path.push("token");
        path
    }

    #[test]
    fn test_save_load_erase() {
        let path = temp_path();
        let store = CredentialStore::new(&path);

        assert_eq!(store.load().unwrap(), None);

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc.def.ghi".to_string()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.erase().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.erase().unwrap();

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_blank_file_is_empty() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "  \n").unwrap();

        let store = CredentialStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
