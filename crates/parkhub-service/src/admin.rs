//! Owner-only commands.

use tracing::info;

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_stats::StatsExport;

use crate::context::ActorContext;
use crate::parking::ParkingService;

/// Largest reply the transport accepts in one message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

impl ParkingService {
    /// Flip whitelist mode. Returns the new mode.
    pub async fn toggle_whitelist(&self, ctx: &ActorContext) -> AppResult<bool> {
        self.access.require_owner(&ctx.actor_id, "whitelist")?;
        Ok(self.access.toggle_whitelist())
    }

    /// Statistics as pretty JSON.
    pub async fn export_stats(&self, ctx: &ActorContext) -> AppResult<String> {
        self.access.require_owner(&ctx.actor_id, "get_stats")?;
        let json = self.stats.export().await.to_json_pretty()?;
        info!(actor = %ctx.actor_id, "Statistics exported");
        Ok(json)
    }

    /// Replace statistics with the given JSON export.
    pub async fn import_stats(&self, ctx: &ActorContext, json: &str) -> AppResult<()> {
        self.access.require_owner(&ctx.actor_id, "set_stats")?;
        if json.trim().is_empty() {
            return Err(AppError::validation("Statistics JSON is missing"));
        }

        let export = StatsExport::from_json(json)?;
        self.stats.import(export).await;
        self.checkpoint().await;
        info!(actor = %ctx.actor_id, "Statistics imported");
        Ok(())
    }

    /// Last `lines` lines of the log file (the configured default when
    /// `None`), split into message-sized chunks.
    pub async fn logs(&self, ctx: &ActorContext, lines: Option<usize>) -> AppResult<Vec<String>> {
        self.access.require_owner(&ctx.actor_id, "logs")?;
        let path = self
            .settings
            .log_file
            .as_ref()
            .ok_or_else(|| AppError::not_found("No log file configured"))?;
        let lines = lines.unwrap_or(self.settings.log_length);

        let contents = tokio::fs::read_to_string(path).await?;
        let all: Vec<&str> = contents.lines().collect();
        let tail = all[all.len().saturating_sub(lines)..].join("\n");

        info!(actor = %ctx.actor_id, lines, "Logs requested");
        Ok(chunk(&tail, MAX_MESSAGE_CHARS))
    }
}

/// Split `text` into pieces of at most `size` characters.
pub(crate) fn chunk(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
