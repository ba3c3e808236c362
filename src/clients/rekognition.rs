//! AWS Rekognition 連携（`aws` CLI 経由）
//!
//! 画像を一時ファイルに書き出し、`aws rekognition detect-labels` /
//! `detect-faces` の JSON 出力を共通ライブラリの型で受け取る。
//! 認証情報は CLI の通常の設定（環境変数・プロファイル）に従う。

use crate::config::RekognitionConfig;
use crate::error::{Result, StyloError};
use std::path::{Path, PathBuf};
use stylo_ai_common::vision::{
    analyze_body, analyze_face, BodyAnalysis, DetectFacesOutput, DetectLabelsOutput, FaceAnalysis,
};
use tokio::process::Command;
use uuid::Uuid;

const MAX_LABELS: &str = "20";
const MIN_CONFIDENCE: &str = "70";

#[derive(Debug, Clone)]
pub struct RekognitionClient {
    config: RekognitionConfig,
}

/// 書き出した一時ファイル（drop時に削除）
struct TempImage(PathBuf);

impl TempImage {
    async fn write(bytes: &[u8]) -> Result<Self> {
        let dir = std::env::temp_dir().join("stylo-ai");
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.img", Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

impl RekognitionClient {
    pub fn new(config: RekognitionConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// 全身写真の分析
    pub async fn analyze_body(&self, bytes: &[u8]) -> Result<BodyAnalysis> {
        let image = TempImage::write(bytes).await?;

        let labels: DetectLabelsOutput = self
            .run(&[
                "detect-labels",
                "--max-labels",
                MAX_LABELS,
                "--min-confidence",
                MIN_CONFIDENCE,
            ], image.path())
            .await?;
        let faces: DetectFacesOutput = self.run(&["detect-faces", "--attributes", "ALL"], image.path()).await?;

        Ok(analyze_body(&labels.labels, &faces.face_details))
    }

    /// 顔写真の分析（顔が無ければエラー）
    pub async fn analyze_face(&self, bytes: &[u8]) -> Result<FaceAnalysis> {
        let image = TempImage::write(bytes).await?;
        let faces: DetectFacesOutput = self.run(&["detect-faces", "--attributes", "ALL"], image.path()).await?;
        Ok(analyze_face(&faces.face_details)?)
    }

    async fn run<T: serde::de::DeserializeOwned>(&self, args: &[&str], image: &Path) -> Result<T> {
        let image_arg = format!("fileb://{}", image.display());

        let output = Command::new("aws")
            .arg("rekognition")
            .args(args)
            .args(["--image-bytes", &image_arg])
            .args(["--region", &self.config.region, "--output", "json"])
            .output()
            .await
            .map_err(|e| StyloError::CliExecution(format!("aws CLI実行エラー: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StyloError::CliExecution(format!(
                "aws rekognition {} failed (code {:?}): {}",
                args.first().copied().unwrap_or_default(),
                output.status.code(),
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            StyloError::CliExecution(format!("aws CLI出力のパースエラー: {}", e))
        })
    }
}
