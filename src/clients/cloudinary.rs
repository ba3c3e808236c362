//! Cloudinary 署名付きアップロード

use crate::config::CloudinaryConfig;
use crate::error::{Result, StyloError};
use serde::Deserialize;
use sha2::{Digest, Sha256};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryClient {
    /// 設定が揃っていなければ None
    pub fn from_config(http: reqwest::Client, config: &CloudinaryConfig) -> Option<Self> {
        Some(Self {
            http,
            cloud_name: config.cloud_name.clone()?,
            api_key: config.api_key.clone()?,
            api_secret: config.api_secret.clone()?,
        })
    }

    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<UploadResponse> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("folder", folder), ("timestamp", &timestamp)], &self.api_secret);

        let file = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!("{}/{}/image/upload", API_BASE, self.cloud_name);
        let response = self.http.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StyloError::Upstream(format!(
                "Cloudinary upload failed ({}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    pub async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("public_id", public_id), ("timestamp", &timestamp)], &self.api_secret);

        let params = [
            ("public_id", public_id),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let url = format!("{}/{}/image/destroy", API_BASE, self.cloud_name);
        let response = self.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(StyloError::Upstream(format!(
                "Cloudinary destroy failed ({})",
                response.status()
            )));
        }

        let body: DestroyResponse = response.json().await?;
        if body.result != "ok" {
            tracing::warn!(public_id, result = %body.result, "cloudinary destroy returned non-ok");
        }
        Ok(())
    }
}

/// パラメータをキー順に `k=v&...` で連結し、シークレットを付けて SHA-256
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{}{}", joined, api_secret).as_bytes()))
}
