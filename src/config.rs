use crate::error::{Result, StyloError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    /// トークン有効期限（日）
    pub jwt_expiry_days: i64,
    /// JSONスナップショット（未指定ならメモリのみ）
    pub data_file: Option<PathBuf>,
    pub upload_dir: PathBuf,
    /// アップロード画像のURLに使う公開URL（未指定なら http://localhost:PORT）
    pub public_url: Option<String>,
    pub frontend_url: String,
    pub weather: WeatherConfig,
    pub google_calendar: GoogleCalendarConfig,
    pub phonepe: PhonePeConfig,
    pub cloudinary: CloudinaryConfig,
    pub rekognition: RekognitionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleCalendarConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhonePeConfig {
    pub merchant_id: Option<String>,
    pub salt_key: Option<String>,
    pub salt_index: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudinaryConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RekognitionConfig {
    /// `aws` CLI経由で画像解析するか
    pub enabled: bool,
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: "change-me-in-production".into(),
            jwt_expiry_days: 30,
            data_file: None,
            upload_dir: PathBuf::from("uploads"),
            public_url: None,
            frontend_url: "http://localhost:8081".into(),
            weather: WeatherConfig::default(),
            google_calendar: GoogleCalendarConfig::default(),
            phonepe: PhonePeConfig::default(),
            cloudinary: CloudinaryConfig::default(),
            rekognition: RekognitionConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".into(),
        }
    }
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: "https://oauth2.googleapis.com/token".into(),
            api_base: "https://www.googleapis.com/calendar/v3".into(),
        }
    }
}

impl Default for PhonePeConfig {
    fn default() -> Self {
        Self {
            merchant_id: None,
            salt_key: None,
            salt_index: "1".into(),
            base_url: "https://api.phonepe.com/apis/hermes".into(),
        }
    }
}

impl Default for RekognitionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "us-east-1".into(),
        }
    }
}

impl GoogleCalendarConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.redirect_uri.is_some()
    }
}

impl PhonePeConfig {
    pub fn is_configured(&self) -> bool {
        self.merchant_id.is_some() && self.salt_key.is_some()
    }
}

impl CloudinaryConfig {
    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

impl Config {
    /// 設定ファイル → 環境変数の順に読み込む
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StyloError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("stylo-ai").join("config.json"))
    }

    /// 環境変数で上書き（`lookup` はテストで差し替える）
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.port = port
                .parse()
                .map_err(|_| StyloError::Config(format!("PORT が不正です: {}", port)))?;
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(path) = var("DATA_FILE") {
            self.data_file = Some(PathBuf::from(path));
        }
        if let Some(dir) = var("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(url) = var("PUBLIC_URL") {
            self.public_url = Some(url);
        }
        if let Some(url) = var("FRONTEND_URL") {
            self.frontend_url = url;
        }

        if let Some(key) = var("OPENWEATHERMAP_API_KEY") {
            self.weather.api_key = Some(key);
        }

        override_opt(&mut self.google_calendar.client_id, var("GOOGLE_CALENDAR_CLIENT_ID"));
        override_opt(&mut self.google_calendar.client_secret, var("GOOGLE_CALENDAR_CLIENT_SECRET"));
        override_opt(&mut self.google_calendar.redirect_uri, var("GOOGLE_CALENDAR_REDIRECT_URI"));

        override_opt(&mut self.phonepe.merchant_id, var("PHONEPE_MERCHANT_ID"));
        override_opt(&mut self.phonepe.salt_key, var("PHONEPE_SALT_KEY"));
        if let Some(index) = var("PHONEPE_SALT_INDEX") {
            self.phonepe.salt_index = index;
        }
        if let Some(url) = var("PHONEPE_BASE_URL") {
            self.phonepe.base_url = url;
        }

        override_opt(&mut self.cloudinary.cloud_name, var("CLOUDINARY_CLOUD_NAME"));
        override_opt(&mut self.cloudinary.api_key, var("CLOUDINARY_API_KEY"));
        override_opt(&mut self.cloudinary.api_secret, var("CLOUDINARY_API_SECRET"));

        if let Some(enabled) = var("AWS_REKOGNITION_ENABLED") {
            self.rekognition.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(region) = var("AWS_REGION") {
            self.rekognition.region = region;
        }

        Ok(())
    }

    /// アップロード画像の公開URLのベース
    pub fn public_base_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
            .trim_end_matches('/')
            .to_string()
    }
}

fn override_opt(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

/// 秘密値の表示用マスク（先頭4文字のみ表示）
pub fn mask_secret(value: Option<&str>) -> String {
    match value {
        None => "未設定".to_string(),
        Some(v) if v.chars().count() <= 4 => "****".to_string(),
        Some(v) => format!("{}****", v.chars().take(4).collect::<String>()),
    }
}
