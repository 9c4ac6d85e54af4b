//! Platform hosts-file loading. Read once at resolver construction; no
//! hot-reload.

use ember_dns_domain::HostsTable;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(windows)]
fn platform_hosts_path() -> PathBuf {
    let root = std::env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".to_string());
    PathBuf::from(root).join(r"System32\drivers\etc\hosts")
}

#[cfg(not(windows))]
fn platform_hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

/// Load the hosts table, falling back to an empty table when the file is
/// missing or unreadable. A resolver without hosts entries still works; it
/// just skips the shortcut.
pub fn load_hosts(path_override: Option<&Path>) -> HostsTable {
    let path = path_override
        .map(Path::to_path_buf)
        .unwrap_or_else(platform_hosts_path);

    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let table = HostsTable::parse(&contents);
            debug!(path = %path.display(), rules = table.rules.len(), "Loaded hosts file");
            table
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read hosts file");
            HostsTable::default()
        }
    }
}
