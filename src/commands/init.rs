use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::store::Database;

pub const DESK_DIR: &str = ".grievance";
pub const DB_FILE: &str = "desk.db";

pub fn run(path: &Path) -> Result<()> {
    let desk_dir = path.join(DESK_DIR);

    if desk_dir.exists() {
        println!("Already initialized at {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(&desk_dir).context("Failed to create .grievance directory")?;
    Database::open(&desk_dir.join(DB_FILE))?;
    println!("Created {}", desk_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_fresh_init() {
        let dir = tempdir().unwrap();
        run(dir.path()).unwrap();

        assert!(dir.path().join(".grievance").is_dir());
        assert!(dir.path().join(".grievance/desk.db").exists());
    }

    #[test]
    fn test_run_already_initialized() {
        let dir = tempdir().unwrap();
        run(dir.path()).unwrap();

        let db = Database::open(&dir.path().join(".grievance/desk.db")).unwrap();
        db.save_session("tok", None).unwrap();
        drop(db);

        // a second init leaves the existing store alone
        run(dir.path()).unwrap();
        let db = Database::open(&dir.path().join(".grievance/desk.db")).unwrap();
        assert!(db.load_session().unwrap().is_some());
    }
}
