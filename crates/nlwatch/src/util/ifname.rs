//! Interface name and index utilities.

use std::path::Path;

/// Where the kernel lists network devices.
pub const SYS_CLASS_NET: &str = "/sys/class/net";

/// Error type for interface operations.
#[derive(Debug, thiserror::Error)]
pub enum IfError {
    #[error("interface not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IfError>;

/// Convert an interface index to name.
pub fn index_to_name(index: u32) -> Result<String> {
    index_to_name_in(Path::new(SYS_CLASS_NET), index)
}

/// Convert an interface index to name, reading from `root` instead of
/// `/sys/class/net`.
pub fn index_to_name_in(root: &Path, index: u32) -> Result<String> {
    if index == 0 {
        return Err(IfError::NotFound("index 0".to_string()));
    }

    list_indexed_in(root)?
        .into_iter()
        .find(|(_, idx)| *idx == index)
        .map(|(name, _)| name)
        .ok_or_else(|| IfError::NotFound(format!("index {}", index)))
}

/// Get an interface name, or `if<index>` if it cannot be resolved.
///
/// # Example
/// ```ignore
/// let name = nlwatch::util::get_ifname_or_index(1);
/// // Returns "lo" if found, or "if1" if not
/// ```
pub fn get_ifname_or_index(index: u32) -> String {
    index_to_name(index).unwrap_or_else(|_| format!("if{}", index))
}

/// List `(name, index)` for every interface, sorted by index.
///
/// Used to seed the interface cache with devices that exist before
/// monitoring starts.
pub fn list_indexed() -> Result<Vec<(String, u32)>> {
    list_indexed_in(Path::new(SYS_CLASS_NET))
}

/// Like [`list_indexed`], reading from `root`.
///
/// Hidden entries and entries without a readable `ifindex` are skipped.
pub fn list_indexed_in(root: &Path) -> Result<Vec<(String, u32)>> {
    let entries = std::fs::read_dir(root)?;

    let mut interfaces = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path().join("ifindex");
        match std::fs::read_to_string(&path) {
            Ok(content) => match content.trim().parse::<u32>() {
                Ok(index) => interfaces.push((name, index)),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "bad ifindex"),
            },
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping entry"),
        }
    }

    interfaces.sort_by_key(|(_, index)| *index);
    Ok(interfaces)
}
