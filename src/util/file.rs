use std::path::Path;

/// Total size in bytes of the files directly inside `dir_path`.
/// Unreadable entries count as zero.
pub fn dir_disk_size<P>(dir_path: P) -> u64
where
  P: AsRef<Path>,
{
  let dir = match std::fs::read_dir(dir_path) {
    Ok(dir) => dir,
    Err(_) => return 0,
  };

  let mut size = 0;
  for entry in dir.flatten() {
    if let Ok(meta) = entry.metadata() {
      if meta.is_file() {
        size += meta.len();
      }
    }
  }
  size
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn test_dir_disk_size() {
    let dir = std::env::temp_dir().join("ember-kv-util-disk-size");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    assert_eq!(dir_disk_size(&dir), 0);

    fs::write(dir.join("a"), b"12345").unwrap();
    fs::write(dir.join("b"), b"123").unwrap();
    assert_eq!(dir_disk_size(&dir), 8);

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn test_dir_disk_size_missing_dir() {
    assert_eq!(dir_disk_size("/tmp/ember-kv-no-such-dir"), 0);
  }
}
