//! Bulk preview rebuild and storage compaction

use tracing::info;

use super::{ClipboardHistory, HistoryError};

/// Database file size around a VACUUM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacuumReport {
    pub before: u64,
    pub after: u64,
}

impl VacuumReport {
    /// Bytes reclaimed (0 if the file grew)
    pub fn freed(&self) -> u64 {
        self.before.saturating_sub(self.after)
    }
}

impl ClipboardHistory {
    /// Recompute every cached preview from the current settings
    ///
    /// Missing icons are generated along the way when icons are enabled.
    /// Returns the number of previews written.
    pub async fn rebuild_previews(&self) -> Result<usize, HistoryError> {
        let entries = self.db.entries(None).await?;

        let previews: Vec<(i64, String)> = entries
            .iter()
            .map(|entry| {
                let icon = if self.settings.show_image_icons {
                    self.icons
                        .icon_path(entry.id)
                        .or_else(|| self.generate_icon(entry.id, &entry.content))
                } else {
                    None
                };

                let preview = self.render(entry.id, &entry.content, entry.is_pinned, icon.as_deref());
                (entry.id, preview)
            })
            .collect();

        self.db.set_previews(&previews).await?;
        info!(count = previews.len(), "Rebuilt previews");
        Ok(previews.len())
    }

    /// Run VACUUM and report the file size before and after
    pub async fn vacuum(&self) -> Result<VacuumReport, HistoryError> {
        let path = self.db.path();
        let before = std::fs::metadata(path)?.len();

        self.db.vacuum().await?;

        let after = std::fs::metadata(path)?.len();
        let report = VacuumReport { before, after };
        info!(before, after, freed = report.freed(), "Vacuumed database");
        Ok(report)
    }
}
