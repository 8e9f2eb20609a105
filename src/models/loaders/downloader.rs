use std::path::Path;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 下载订单 CSV 到本地
///
/// `overwrite` 为 false 且本地文件已存在时跳过下载
pub async fn download_orders_csv(url: &str, dest: &Path, overwrite: bool) -> AppResult<()> {
    if !overwrite && dest.exists() {
        info!("📄 订单文件已存在，跳过下载: {}", dest.display());
        return Ok(());
    }

    info!("⬇️ 正在下载订单文件: {}", url);
    let download_error = |reason: String| AppError::Download {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|e| download_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("HTTP {}", status)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_error(e.to_string()))?;
    debug!("下载完成: {} 字节", bytes.len());

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| download_error(format!("无法创建目录 {}: {}", parent.display(), e)))?;
    }
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| download_error(format!("无法写入 {}: {}", dest.display(), e)))?;

    info!("✓ 订单文件已保存至: {}", dest.display());
    Ok(())
}
