use crate::clients::{
    CloudinaryClient, GoogleCalendarClient, PhonePeClient, RekognitionClient, WeatherClient,
};
use crate::config::Config;
use crate::error::Result;
use crate::store::Store;
use crate::uploads::{ImageStorage, LocalUploads};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// ハンドラ間で共有する状態
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub images: ImageStorage,
    pub weather: WeatherClient,
    pub calendar: GoogleCalendarClient,
    pub phonepe: PhonePeClient,
    pub vision: RekognitionClient,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let local = LocalUploads::new(config.upload_dir.clone(), config.public_base_url());
        let cloudinary = CloudinaryClient::from_config(http.clone(), &config.cloudinary);
        if cloudinary.is_none() {
            tracing::info!(dir = %config.upload_dir.display(), "cloudinary not configured, storing images locally");
        }

        Ok(Self {
            images: ImageStorage::new(cloudinary, local),
            weather: WeatherClient::new(http.clone(), config.weather.clone()),
            calendar: GoogleCalendarClient::new(http.clone(), config.google_calendar.clone()),
            phonepe: PhonePeClient::new(http, config.phonepe.clone()),
            vision: RekognitionClient::new(config.rekognition.clone()),
            config,
            store,
        })
    }
}
