//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("No items in wardrobe")]
    EmptyWardrobe,

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid style type: {0}")]
    InvalidStyleType(String),

    #[error("Invalid occasion: {0}")]
    InvalidOccasion(String),

    #[error("No face detected in the image")]
    NoFaceDetected,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
