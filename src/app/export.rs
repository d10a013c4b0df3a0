use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::AppResult;
use crate::metrics::{RequestOutcome, SummaryStatistics};

pub(crate) async fn export_json(
    path: &str,
    summary: &SummaryStatistics,
    outcomes: &[RequestOutcome],
) -> AppResult<()> {
    let payload = serde_json::json!({
        "summary": summary,
        "outcomes": outcomes
    });

    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&payload)?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}
