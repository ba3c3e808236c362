//! 画像アップロード
//!
//! - 画像形式の検証（マジックバイト判定）
//! - Cloudinary への保存、未設定・失敗時はローカル `uploads/` へ保存
//! - ローカル保存先の統計と孤立ファイルの削除

use crate::clients::cloudinary::CloudinaryClient;
use crate::error::{Result, StyloError};
use crate::models::StoredImage;
use image::ImageFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// アップロード上限（5MB）
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// 画像として受け付けられるか判定し、形式を返す
pub fn validate_image(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(StyloError::InvalidImage("No image file provided".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StyloError::InvalidImage(format!(
            "file too large ({} bytes, max {})",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| StyloError::InvalidImage("Only image files are allowed".into()))?;

    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(StyloError::InvalidImage(format!("unsupported format: {:?}", format)));
    }

    Ok(format)
}

fn extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

/// ローカル保存先
#[derive(Debug, Clone)]
pub struct LocalUploads {
    dir: PathBuf,
    base_url: String,
}

impl LocalUploads {
    pub fn new(dir: PathBuf, base_url: String) -> Self {
        Self { dir, base_url }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, bytes: &[u8], format: ImageFormat) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), extension(format));
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        Ok(file_name)
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.base_url, file_name)
    }

    pub async fn remove(&self, file_name: &str) -> Result<()> {
        // ディレクトリ外を指す名前は無視
        if Path::new(file_name).components().count() != 1 {
            return Ok(());
        }
        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 保存結果
#[derive(Debug, Clone)]
pub struct SavedImage {
    pub url: String,
    pub storage: StoredImage,
}

/// 画像の保存先（Cloudinary優先、ローカルにフォールバック）
#[derive(Debug, Clone)]
pub struct ImageStorage {
    cloudinary: Option<CloudinaryClient>,
    local: LocalUploads,
}

impl ImageStorage {
    pub fn new(cloudinary: Option<CloudinaryClient>, local: LocalUploads) -> Self {
        Self { cloudinary, local }
    }

    pub fn local(&self) -> &LocalUploads {
        &self.local
    }

    /// 検証済みの画像を保存する
    pub async fn save(&self, bytes: Vec<u8>, folder: &str) -> Result<SavedImage> {
        let format = validate_image(&bytes)?;

        if let Some(cloudinary) = &self.cloudinary {
            let name = format!("upload.{}", extension(format));
            match cloudinary.upload(bytes.clone(), &name, folder).await {
                Ok(uploaded) => {
                    return Ok(SavedImage {
                        url: uploaded.secure_url,
                        storage: StoredImage::Cloudinary {
                            public_id: uploaded.public_id,
                        },
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cloudinary upload failed, falling back to local storage");
                }
            }
        }

        let file_name = self.local.save(&bytes, format).await?;
        Ok(SavedImage {
            url: self.local.url_for(&file_name),
            storage: StoredImage::Local { file_name },
        })
    }

    /// 画像を削除する（失敗はログのみ）
    pub async fn delete(&self, storage: &StoredImage) {
        let result = match storage {
            StoredImage::Cloudinary { public_id } => match &self.cloudinary {
                Some(cloudinary) => cloudinary.destroy(public_id).await,
                None => Ok(()),
            },
            StoredImage::Local { file_name } => self.local.remove(file_name).await,
        };

        if let Err(e) = result {
            tracing::error!(error = %e, ?storage, "image deletion failed");
        }
    }
}

/// ローカル保存先の統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadStats {
    pub files: usize,
    pub bytes: u64,
}

fn upload_files(dir: &Path) -> impl Iterator<Item = (PathBuf, u64)> {
    WalkDir::new(dir)
        .max_depth(1) // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let size = e.metadata().map(|m| m.len()).unwrap_or(0);
            (e.into_path(), size)
        })
}

pub fn scan(dir: &Path) -> Result<UploadStats> {
    if !dir.exists() {
        return Ok(UploadStats::default());
    }

    Ok(upload_files(dir).fold(UploadStats::default(), |mut stats, (_, size)| {
        stats.files += 1;
        stats.bytes += size;
        stats
    }))
}

/// どのレコードからも参照されていないファイルを列挙（`dry_run` でなければ削除）
pub fn prune(dir: &Path, referenced: &HashSet<String>, dry_run: bool) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut orphans: Vec<PathBuf> = upload_files(dir)
        .map(|(path, _)| path)
        .filter(|path| {
            path.file_name()
                .map(|n| !referenced.contains(n.to_string_lossy().as_ref()))
                .unwrap_or(false)
        })
        .collect();
    orphans.sort();

    if !dry_run {
        for path in &orphans {
            std::fs::remove_file(path)?;
        }
    }

    Ok(orphans)
}
