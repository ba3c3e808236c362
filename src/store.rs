//! JSONスナップショットストア
//!
//! 全コレクションをメモリ上に保持し、書き込みが成功するたびに
//! データファイルへ書き出す。データファイル未指定ならメモリのみ。

use crate::error::{Result, StyloError};
use crate::models::{
    DailyOutfitRecord, GapReport, OutfitRecord, PaymentRecord, PlannerRecord, StoredImage,
    StyleHistoryRecord, User, WardrobeRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

/// データファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    /// バージョン（互換性チェック用）
    version: u32,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub wardrobe: Vec<WardrobeRecord>,
    #[serde(default)]
    pub outfits: Vec<OutfitRecord>,
    #[serde(default)]
    pub daily_outfits: Vec<DailyOutfitRecord>,
    #[serde(default)]
    pub planners: Vec<PlannerRecord>,
    #[serde(default)]
    pub gaps: Vec<GapReport>,
    #[serde(default)]
    pub style_history: Vec<StyleHistoryRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            users: Vec::new(),
            wardrobe: Vec::new(),
            outfits: Vec::new(),
            daily_outfits: Vec::new(),
            planners: Vec::new(),
            gaps: Vec::new(),
            style_history: Vec::new(),
            payments: Vec::new(),
        }
    }
}

impl Database {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StyloError::NotFound("User not found".into()))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// ユーザーのワードローブ（登録の新しい順）
    pub fn wardrobe_of(&self, user_id: Uuid) -> Vec<&WardrobeRecord> {
        let mut items: Vec<&WardrobeRecord> =
            self.wardrobe.iter().filter(|w| w.user_id == user_id).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn outfit(&self, user_id: Uuid, outfit_id: Uuid) -> Option<&OutfitRecord> {
        self.outfits
            .iter()
            .find(|o| o.id == outfit_id && o.user_id == user_id)
    }

    pub fn outfit_mut(&mut self, user_id: Uuid, outfit_id: Uuid) -> Result<&mut OutfitRecord> {
        self.outfits
            .iter_mut()
            .find(|o| o.id == outfit_id && o.user_id == user_id)
            .ok_or_else(|| StyloError::NotFound("Outfit not found".into()))
    }

    /// ローカル `uploads/` 内で参照されているファイル名
    pub fn referenced_uploads(&self) -> HashSet<String> {
        let local = self.wardrobe.iter().filter_map(|w| match &w.storage {
            StoredImage::Local { file_name } => Some(file_name.clone()),
            StoredImage::Cloudinary { .. } => None,
        });

        let profile = self
            .users
            .iter()
            .flat_map(|u| [&u.body_analysis, &u.face_analysis])
            .flatten()
            .map(|a| a.image_url.as_str());
        let photos = self
            .style_history
            .iter()
            .flat_map(|h| h.photos.iter().map(|p| p.image_url.as_str()));

        local
            .chain(profile.chain(photos).filter_map(upload_file_name))
            .collect()
    }

    fn counts(&self) -> [(&'static str, usize); 8] {
        [
            ("users", self.users.len()),
            ("wardrobe", self.wardrobe.len()),
            ("outfits", self.outfits.len()),
            ("dailyOutfits", self.daily_outfits.len()),
            ("planners", self.planners.len()),
            ("gaps", self.gaps.len()),
            ("styleHistory", self.style_history.len()),
            ("payments", self.payments.len()),
        ]
    }
}

pub struct Store {
    db: RwLock<Database>,
    path: Option<PathBuf>,
}

impl Store {
    /// データファイルを読み込む（存在しなければ空で開始）
    pub fn open(path: &Path) -> Result<Self> {
        let db = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let db: Database = serde_json::from_str(&content)?;
            if db.version != Database::CURRENT_VERSION {
                return Err(StyloError::Config(format!(
                    "データファイルのバージョン不一致: {} (期待値 {})",
                    db.version,
                    Database::CURRENT_VERSION
                )));
            }
            db
        } else {
            Database::default()
        };

        tracing::info!(path = %path.display(), users = db.users.len(), "store opened");

        Ok(Self {
            db: RwLock::new(db),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            db: RwLock::new(Database::default()),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        let db = self.db.read().await;
        f(&db)
    }

    /// 変更を適用して保存する
    ///
    /// クロージャがエラーを返した場合は何も反映しない。
    pub async fn write<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.db.write().await;
        let mut draft = db.clone();
        let value = f(&mut draft)?;

        if let Some(path) = &self.path {
            flush(path, &draft).await?;
        }
        *db = draft;
        Ok(value)
    }

    /// コレクションごとの件数
    pub async fn stats(&self) -> Vec<(&'static str, usize)> {
        self.read(|db| db.counts().to_vec()).await
    }
}

fn upload_file_name(url: &str) -> Option<String> {
    url.split_once("/uploads/")
        .map(|(_, name)| name.trim_end_matches('/'))
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(str::to_string)
}

async fn flush(path: &Path, db: &Database) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_vec_pretty(db)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
