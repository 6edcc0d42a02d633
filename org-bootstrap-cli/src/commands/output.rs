use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Owner read/write only: login sheets carry clear-text passwords.
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;

/// Write `value` as pretty JSON readable by the owner only.
///
/// A new file is created with the private mode; an existing one is
/// restricted before anything is written to it.
pub async fn write_private_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PRIVATE_MODE);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(PRIVATE_MODE))
            .await
            .with_context(|| format!("Failed to restrict {}", path.display()))?;
    }

    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.flush().await?;

    Ok(())
}
