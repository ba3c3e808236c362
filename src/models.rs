//! 永続化レコード定義
//!
//! ストアに保存されるユーザー・ワードローブ・コーデ・プランなどの型。
//! JSON上のフィールド名はモバイルクライアントに合わせて camelCase。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stylo_ai_common::calendar::EventType;
use stylo_ai_common::gap::MissingItem;
use stylo_ai_common::{
    Category, Mood, Occasion, OutfitItem, OutfitSelection, StyleType, Weather, WardrobeItem,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleGoal {
    Professional,
    Casual,
    Trendy,
    Elegant,
    Minimal,
}

/// 体型・顔写真の解析結果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAnalysis {
    pub image_url: String,
    pub analysis_data: serde_json::Value,
    pub uploaded_at: DateTime<Utc>,
}

/// Google Calendar のOAuthトークン
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub connected_at: DateTime<Utc>,
}

impl CalendarTokens {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub style_goals: Vec<StyleGoal>,
    #[serde(default)]
    pub occasions: Vec<Occasion>,
    #[serde(default)]
    pub body_analysis: Option<PhotoAnalysis>,
    #[serde(default)]
    pub face_analysis: Option<PhotoAnalysis>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub premium_activated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub calendar: Option<CalendarTokens>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, phone: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            phone,
            password_hash,
            gender: None,
            style_goals: Vec::new(),
            occasions: Vec::new(),
            body_analysis: None,
            face_analysis: None,
            is_premium: false,
            premium_activated_at: None,
            premium_expires_at: None,
            calendar: None,
            created_at: Utc::now(),
        }
    }

    /// 有効期限を考慮したプレミアム判定
    pub fn premium_active(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_expires_at.map_or(true, |at| at > now)
    }
}

/// クライアントに返すユーザー情報（パスワードハッシュ・トークンを含まない）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub style_goals: Vec<StyleGoal>,
    pub occasions: Vec<Occasion>,
    pub body_analysis: Option<PhotoAnalysis>,
    pub face_analysis: Option<PhotoAnalysis>,
    pub is_premium: bool,
    pub calendar_connected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone: user.phone.clone(),
            gender: user.gender,
            style_goals: user.style_goals.clone(),
            occasions: user.occasions.clone(),
            body_analysis: user.body_analysis.clone(),
            face_analysis: user.face_analysis.clone(),
            is_premium: user.premium_active(Utc::now()),
            calendar_connected: user.calendar.is_some(),
            created_at: user.created_at,
        }
    }
}

/// 画像の保存先
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StoredImage {
    Cloudinary {
        #[serde(rename = "publicId")]
        public_id: String,
    },
    Local {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: Category,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub style_tags: Vec<String>,
    pub image_url: String,
    pub storage: StoredImage,
    pub created_at: DateTime<Utc>,
}

impl WardrobeRecord {
    pub fn to_item(&self) -> WardrobeItem {
        WardrobeItem {
            id: self.id,
            category: self.category,
            color: self.color.clone(),
            style_tags: self.style_tags.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OutfitItem>,
    #[serde(default)]
    pub shoes: Option<OutfitItem>,
    #[serde(default)]
    pub accessories: Vec<OutfitItem>,
    pub hairstyle_suggestion: String,
    pub style_type: StyleType,
    #[serde(default)]
    pub occasion: Option<Occasion>,
    /// 生成時の天気（sunny/rainy など）
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub is_saved: bool,
    /// 直近に着用したコーデと同じ組み合わせだった場合のコーデID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recently_worn: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl OutfitRecord {
    pub fn from_selection(
        user_id: Uuid,
        selection: OutfitSelection,
        style_type: StyleType,
        occasion: Option<Occasion>,
        weather: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: selection.items,
            shoes: selection.shoes,
            accessories: selection.accessories,
            hairstyle_suggestion: selection.hairstyle_suggestion,
            style_type,
            occasion,
            weather,
            is_saved: false,
            recently_worn: selection.recently_worn,
            created_at: Utc::now(),
        }
    }

    pub fn main_item_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.items.iter().map(|i| i.wardrobe_id)
    }
}

/// クライアントから渡されるカレンダー予定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOutfitRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub outfit_id: Uuid,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub calendar_events: Vec<EventRef>,
    #[serde(default)]
    pub user_mood: Mood,
    pub occasion: Occasion,
    pub style_type: StyleType,
    #[serde(default)]
    pub is_worn: bool,
    #[serde(default)]
    pub worn_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 週間プランの1日分
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDay {
    pub date: NaiveDate,
    pub outfit_id: Uuid,
    #[serde(default)]
    pub occasion: Option<Occasion>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub is_recently_worn: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub outfits: Vec<PlannedDay>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlannerRecord {
    /// 指定週（開始日から7日間）に開始日が含まれるか
    pub fn starts_within_week(&self, week_start: NaiveDate) -> bool {
        let week_end = week_start + chrono::Duration::days(6);
        self.week_start_date >= week_start && self.week_start_date <= week_end
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub missing_items: Vec<MissingItem>,
    pub analysis_date: DateTime<Utc>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePhoto {
    pub image_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleHistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub outfit_id: Uuid,
    pub worn_date: NaiveDate,
    #[serde(default)]
    pub occasion: Option<Occasion>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub photos: Vec<StylePhoto>,
    pub style_score: u8,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Monthly,
    Yearly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

/// PhonePe の決済トランザクション
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub merchant_transaction_id: String,
    pub user_id: Uuid,
    pub plan_type: PlanType,
    /// ルピー単位
    pub amount: u32,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_premium_active_respects_expiry() {
        let now = Utc::now();
        let mut user = User::new("a@example.com".into(), None, "hash".into());
        assert!(!user.premium_active(now));

        user.is_premium = true;
        user.premium_expires_at = Some(now + Duration::days(3));
        assert!(user.premium_active(now));

        user.premium_expires_at = Some(now - Duration::seconds(1));
        assert!(!user.premium_active(now));
    }

    #[test]
    fn test_user_view_hides_password() {
        let user = User::new("a@example.com".into(), Some("999".into()), "secret-hash".into());
        let json = serde_json::to_string(&UserView::from(&user)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"calendarConnected\":false"));
    }

    #[test]
    fn test_stored_image_tagged() {
        let json = serde_json::to_value(StoredImage::Local { file_name: "a.png".into() }).unwrap();
        assert_eq!(json["kind"], "local");
        assert_eq!(json["fileName"], "a.png");
    }

    #[test]
    fn test_planner_week_window() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let now = Utc::now();
        let plan = PlannerRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            week_start_date: start + Duration::days(2),
            week_end_date: start + Duration::days(8),
            outfits: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(plan.starts_within_week(start));
        assert!(!plan.starts_within_week(start + Duration::days(3)));
    }

    #[test]
    fn test_calendar_tokens_expiry() {
        let now = Utc::now();
        let tokens = CalendarTokens {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: Some(now - Duration::minutes(1)),
            connected_at: now,
        };
        assert!(tokens.is_expired(now));
    }
}
