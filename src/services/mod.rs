//! ユースケース層
//!
//! ハンドラから呼ばれる処理。ストアへの書き込みは1操作につき1回にまとめる。

pub mod account;
pub mod calendar;
pub mod daily;
pub mod gaps;
pub mod history;
pub mod occasions;
pub mod outfits;
pub mod payment;
pub mod planner;
pub mod wardrobe;
