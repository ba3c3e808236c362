//! StyloAI Common Library
//!
//! サーバーとCLIで共有されるドメイン型とルール（I/Oなし）

pub mod calendar;
pub mod color;
pub mod error;
pub mod gap;
pub mod occasion;
pub mod outfit;
pub mod style_score;
pub mod types;
pub mod vision;
pub mod weather;

pub use calendar::{categorize_event, EventType};
pub use color::{colors_compatible, is_neutral};
pub use error::{Error, Result};
pub use gap::{detect_gaps, MissingItem, ShoppingLink};
pub use occasion::{styling_guide, StylingGuide};
pub use outfit::{select_outfit, RecentlyWorn};
pub use style_score::{style_score, StyleProgress};
pub use types::{Category, Mood, Occasion, OutfitItem, OutfitSelection, Priority, StyleType, WardrobeItem};
pub use weather::{Weather, WeatherCondition};
