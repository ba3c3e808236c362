//! プレミアム会員の決済
//!
//! 注文作成 → PhonePe の決済ページ → 検証（クライアント経由または Webhook）で
//! プレミアムを有効化する。有効期間はプランによらず30日。

use crate::clients::phonepe::{transaction_id, PayRequest, TransactionStatus};
use crate::error::{Result, StyloError};
use crate::models::{PaymentRecord, PaymentStatus, PlanType, User};
use crate::state::AppState;
use crate::store::Database;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const PREMIUM_DAYS: i64 = 30;

/// 電話番号未登録時に PhonePe へ渡す番号
const FALLBACK_MOBILE: &str = "9999999999";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanType,
    pub name: &'static str,
    pub price: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<&'static str>,
    pub duration: &'static str,
    pub features: Vec<&'static str>,
}

pub fn plan(plan_type: PlanType) -> Plan {
    match plan_type {
        PlanType::Monthly => Plan {
            id: PlanType::Monthly,
            name: "Monthly Premium",
            price: 299,
            original_price: None,
            discount: None,
            duration: "1 month",
            features: vec![
                "Daily outfit suggestions",
                "Weekly planner",
                "Occasion styling",
                "Wardrobe gap detection",
                "Style history tracking",
            ],
        },
        PlanType::Yearly => Plan {
            id: PlanType::Yearly,
            name: "Yearly Premium",
            price: 2499,
            original_price: Some(3588),
            discount: Some("30% OFF"),
            duration: "12 months",
            features: vec![
                "All monthly features",
                "Priority support",
                "Advanced AI recommendations",
                "Early access to new features",
            ],
        },
    }
}

pub fn plans() -> Vec<Plan> {
    vec![plan(PlanType::Monthly), plan(PlanType::Yearly)]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub payment_url: String,
    pub transaction_id: String,
    pub merchant_transaction_id: String,
}

/// 決済ページを作成する
pub async fn create_order(
    state: &AppState,
    user: &User,
    plan_type: PlanType,
    amount: u32,
    now: DateTime<Utc>,
) -> Result<OrderCreated> {
    let price = plan(plan_type).price;
    if amount != price {
        return Err(StyloError::Validation(format!(
            "Invalid amount for {} plan (expected {})",
            plan_type.as_str(),
            price
        )));
    }
    if !state.phonepe.is_configured() {
        return Err(StyloError::NotConfigured("PhonePe".into()));
    }

    let merchant_transaction_id = transaction_id(now.timestamp_millis(), &mut rand::rng());
    let request = PayRequest {
        merchant_transaction_id: merchant_transaction_id.clone(),
        merchant_user_id: user.id.to_string(),
        amount,
        redirect_url: format!("{}/payment/callback", state.config.frontend_url.trim_end_matches('/')),
        callback_url: format!("{}/api/payment/callback", state.config.public_base_url()),
        mobile_number: user.phone.clone().unwrap_or_else(|| FALLBACK_MOBILE.to_string()),
    };

    let payment_url = state.phonepe.create_payment(&request).await?;

    let record = PaymentRecord {
        merchant_transaction_id: merchant_transaction_id.clone(),
        user_id: user.id,
        plan_type,
        amount,
        status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .write(|db| {
            db.payments.push(record);
            Ok(())
        })
        .await?;

    tracing::info!(user_id = %user.id, txn = %merchant_transaction_id, ?plan_type, "payment order created");

    Ok(OrderCreated {
        payment_url,
        transaction_id: merchant_transaction_id.clone(),
        merchant_transaction_id,
    })
}

/// プレミアムを有効化（期限は now + 30日）
pub fn activate_premium(db: &mut Database, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
    let user = db.user_mut(user_id)?;
    user.is_premium = true;
    user.premium_activated_at = Some(now);
    user.premium_expires_at = Some(now + Duration::days(PREMIUM_DAYS));
    Ok(())
}

fn settle(db: &mut Database, merchant_transaction_id: &str, status: PaymentStatus, now: DateTime<Utc>) {
    if let Some(payment) = db
        .payments
        .iter_mut()
        .find(|p| p.merchant_transaction_id == merchant_transaction_id)
    {
        payment.status = status;
        payment.updated_at = now;
    }
}

#[derive(Debug, Clone)]
pub enum Verification {
    Completed { transaction_id: String, amount: f64 },
    Incomplete { code: String, state: Option<String> },
}

/// 取引状態を問い合わせ、完了していればプレミアムを有効化する
pub async fn verify(
    state: &AppState,
    user_id: Uuid,
    merchant_transaction_id: &str,
    now: DateTime<Utc>,
) -> Result<Verification> {
    let owned = state
        .store
        .read(|db| {
            db.payments
                .iter()
                .any(|p| p.merchant_transaction_id == merchant_transaction_id && p.user_id == user_id)
        })
        .await;
    if !owned {
        return Err(StyloError::NotFound("Transaction not found".into()));
    }

    let status = state.phonepe.status(merchant_transaction_id).await?;
    if !status.is_completed() {
        tracing::info!(%user_id, txn = merchant_transaction_id, code = %status.code, "payment not completed");
        return Ok(Verification::Incomplete {
            code: status.code,
            state: status.state,
        });
    }

    state
        .store
        .write(|db| {
            settle(db, merchant_transaction_id, PaymentStatus::Success, now);
            activate_premium(db, user_id, now)
        })
        .await?;

    tracing::info!(%user_id, txn = merchant_transaction_id, "premium activated");

    Ok(Verification::Completed {
        transaction_id: merchant_transaction_id.to_string(),
        amount: status.amount.unwrap_or_default() as f64 / 100.0,
    })
}

/// Webhook の対象ユーザー（merchantUserId、無ければ決済記録から）
fn webhook_user(db: &Database, status: &TransactionStatus) -> Option<Uuid> {
    status
        .merchant_user_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok())
        .filter(|id| db.user(*id).is_some())
        .or_else(|| {
            let txn = status.merchant_transaction_id.as_deref()?;
            db.payments
                .iter()
                .find(|p| p.merchant_transaction_id == txn)
                .map(|p| p.user_id)
        })
}

/// Webhook を処理する（プレミアムを有効化したら true）
pub async fn handle_webhook(
    state: &AppState,
    encoded: &str,
    x_verify: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let status = state.phonepe.verify_webhook(encoded, x_verify)?;
    let txn = status.merchant_transaction_id.clone().unwrap_or_default();

    let activated = state
        .store
        .write(|db| {
            if !status.is_completed() {
                if status.state.as_deref() == Some("FAILED") {
                    settle(db, &txn, PaymentStatus::Failed, now);
                }
                return Ok(false);
            }

            let Some(user_id) = webhook_user(db, &status) else {
                return Ok(false);
            };
            settle(db, &txn, PaymentStatus::Success, now);
            activate_premium(db, user_id, now)?;
            Ok(true)
        })
        .await?;

    tracing::info!(txn = %txn, code = %status.code, activated, "payment webhook processed");
    Ok(activated)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumStatus {
    pub is_premium: bool,
    pub premium_activated_at: Option<DateTime<Utc>>,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub days_remaining: i64,
}

/// 残り日数（切り上げ、0未満にはしない）
pub fn days_remaining(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    const DAY_SECONDS: i64 = 24 * 60 * 60;
    match expires_at {
        Some(at) if at > now => {
            let seconds = (at - now).num_seconds();
            (seconds + DAY_SECONDS - 1) / DAY_SECONDS
        }
        _ => 0,
    }
}

/// 会員状態（期限切れならこの時点で解除する）
pub async fn premium_status(state: &AppState, user_id: Uuid, now: DateTime<Utc>) -> Result<PremiumStatus> {
    let user = state
        .store
        .read(|db| db.user(user_id).cloned())
        .await
        .ok_or_else(|| StyloError::NotFound("User not found".into()))?;

    let expired = user.is_premium && !user.premium_active(now);
    if expired {
        state
            .store
            .write(|db| {
                db.user_mut(user_id)?.is_premium = false;
                Ok(())
            })
            .await?;
        tracing::info!(%user_id, "premium expired");
    }

    Ok(PremiumStatus {
        is_premium: user.is_premium && !expired,
        premium_activated_at: user.premium_activated_at,
        premium_expires_at: user.premium_expires_at,
        days_remaining: days_remaining(user.premium_expires_at, now),
    })
}
