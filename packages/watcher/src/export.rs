//! Sorted JSON export of the accepted snapshot, for external mirroring.

use std::fs;
use std::path::Path;

use crate::error::{Result, WatchError};
use crate::types::Snapshot;

/// Write the snapshot as pretty JSON. The snapshot is a BTreeMap, so the
/// document is slug-ordered and byte-stable for identical data.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_vec_pretty(snapshot).map_err(WatchError::export)?;
    fs::write(path, json).map_err(WatchError::export)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewRecord, ReviewStatus};

    #[test]
    fn export_is_slug_ordered_and_stable() {
        let mut snapshot = Snapshot::new();
        for slug in ["babergh", "allerdale"] {
            snapshot.insert(
                slug.to_string(),
                ReviewRecord::new(
                    slug.to_string(),
                    slug.to_string(),
                    format!("http://example.org/reviews/{}", slug),
                    ReviewStatus::Current,
                ),
            );
        }

        let dir = std::env::temp_dir().join("boundary-watch-export-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");

        write_snapshot(&path, &snapshot).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        assert!(first.find("allerdale").unwrap() < first.find("babergh").unwrap());

        write_snapshot(&path, &snapshot).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }
}
