//! 外部サービスのクライアント

pub mod cloudinary;
pub mod google_calendar;
pub mod phonepe;
pub mod rekognition;
pub mod weather;

pub use cloudinary::CloudinaryClient;
pub use google_calendar::{CalendarEvent, GoogleCalendarClient};
pub use phonepe::PhonePeClient;
pub use rekognition::RekognitionClient;
pub use weather::WeatherClient;
