//! PhonePe 決済ゲートウェイ
//!
//! リクエストは base64 化したJSONを `{request}` で送り、
//! `X-VERIFY = sha256(本文 + エンドポイント + saltKey) + "###" + saltIndex` で署名する。

use crate::config::PhonePeConfig;
use crate::error::{Result, StyloError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

const PAY_ENDPOINT: &str = "/pg/v1/pay";
const WEBHOOK_ENDPOINT: &str = "/pg/v1/webhook";

/// `X-VERIFY` ヘッダ値
pub fn checksum(body: &str, endpoint: &str, salt_key: &str, salt_index: &str) -> String {
    let digest = Sha256::digest(format!("{}{}{}", body, endpoint, salt_key).as_bytes());
    format!("{}###{}", hex::encode(digest), salt_index)
}

/// `TXN{ミリ秒}{英数字9文字}` 形式の取引ID
pub fn transaction_id<R: Rng + ?Sized>(now_millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();
    format!("TXN{}{}", now_millis, suffix)
}

#[derive(Debug, Clone)]
pub struct PhonePeClient {
    http: reqwest::Client,
    config: PhonePeConfig,
}

/// 決済ページ作成の入力
#[derive(Debug, Clone)]
pub struct PayRequest {
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    /// ルピー単位
    pub amount: u32,
    pub redirect_url: String,
    pub callback_url: String,
    pub mobile_number: String,
}

/// 取引状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
    /// パイサ単位
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub merchant_transaction_id: Option<String>,
    #[serde(default)]
    pub merchant_user_id: Option<String>,
}

impl TransactionStatus {
    pub fn is_completed(&self) -> bool {
        self.code == "PAYMENT_SUCCESS" && self.state.as_deref() == Some("COMPLETED")
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayData {
    instrument_response: InstrumentResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    redirect_info: RedirectInfo,
}

#[derive(Debug, Deserialize)]
struct RedirectInfo {
    url: String,
}

/// Webhook 本文（base64デコード後）
#[derive(Debug, Deserialize)]
struct WebhookBody {
    code: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookData {
    #[serde(default)]
    merchant_transaction_id: Option<String>,
    #[serde(default)]
    merchant_user_id: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    amount: Option<u64>,
}

struct Merchant<'a> {
    id: &'a str,
    salt_key: &'a str,
}

impl PhonePeClient {
    pub fn new(http: reqwest::Client, config: PhonePeConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn merchant(&self) -> Result<Merchant<'_>> {
        match (self.config.merchant_id.as_deref(), self.config.salt_key.as_deref()) {
            (Some(id), Some(salt_key)) => Ok(Merchant { id, salt_key }),
            _ => Err(StyloError::NotConfigured("PhonePe".into())),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// 決済ページを作成し、リダイレクトURLを返す
    pub async fn create_payment(&self, request: &PayRequest) -> Result<String> {
        let merchant = self.merchant()?;

        let payload = json!({
            "merchantId": merchant.id,
            "merchantTransactionId": request.merchant_transaction_id,
            "merchantUserId": request.merchant_user_id,
            "amount": u64::from(request.amount) * 100,
            "redirectUrl": request.redirect_url,
            "redirectMode": "POST",
            "callbackUrl": request.callback_url,
            "mobileNumber": request.mobile_number,
            "paymentInstrument": { "type": "PAY_PAGE" },
        });
        let encoded = BASE64.encode(serde_json::to_vec(&payload)?);
        let x_verify = checksum(&encoded, PAY_ENDPOINT, merchant.salt_key, &self.config.salt_index);

        let response = self
            .http
            .post(format!("{}{}", self.base_url(), PAY_ENDPOINT))
            .header("X-VERIFY", x_verify)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "request": encoded }))
            .send()
            .await?;

        let body: ApiResponse<PayData> = response.json().await?;
        match body.data {
            Some(data) if body.success => Ok(data.instrument_response.redirect_info.url),
            _ => Err(StyloError::Upstream(
                body.message
                    .unwrap_or_else(|| "Payment order creation failed".to_string()),
            )),
        }
    }

    /// 取引状態を問い合わせる
    pub async fn status(&self, merchant_transaction_id: &str) -> Result<TransactionStatus> {
        let merchant = self.merchant()?;
        let path = format!("/pg/v1/status/{}/{}", merchant.id, merchant_transaction_id);
        let x_verify = checksum("", &path, merchant.salt_key, &self.config.salt_index);

        let response = self
            .http
            .get(format!("{}{}", self.base_url(), path))
            .header("X-VERIFY", x_verify)
            .header("X-MERCHANT-ID", merchant.id)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let body: ApiResponse<TransactionStatus> = response.json().await?;
        match body.data {
            Some(status) if body.success => Ok(status),
            _ => Err(StyloError::Upstream(
                body.message
                    .unwrap_or_else(|| "Payment verification failed".to_string()),
            )),
        }
    }

    /// Webhook の署名を検証して本文を返す
    pub fn verify_webhook(&self, encoded: &str, x_verify: Option<&str>) -> Result<TransactionStatus> {
        let merchant = self.merchant()?;
        let expected = checksum(encoded, WEBHOOK_ENDPOINT, merchant.salt_key, &self.config.salt_index);

        if x_verify != Some(expected.as_str()) {
            return Err(StyloError::Validation("Invalid checksum".into()));
        }

        let decoded = BASE64
            .decode(encoded)
            .map_err(|_| StyloError::Validation("Invalid webhook payload".into()))?;
        let body: WebhookBody = serde_json::from_slice(&decoded)
            .map_err(|_| StyloError::Validation("Invalid webhook payload".into()))?;

        Ok(TransactionStatus {
            code: body.code,
            state: body.data.state,
            amount: body.data.amount,
            merchant_transaction_id: body.data.merchant_transaction_id,
            merchant_user_id: body.data.merchant_user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn client() -> PhonePeClient {
        PhonePeClient::new(
            reqwest::Client::new(),
            PhonePeConfig {
                merchant_id: Some("MERCHANT".into()),
                salt_key: Some("salt".into()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_checksum_format() {
        let value = checksum("abc", PAY_ENDPOINT, "salt", "1");
        let expected = hex::encode(Sha256::digest(b"abc/pg/v1/paysalt"));
        assert_eq!(value, format!("{}###1", expected));
    }

    #[test]
    fn test_transaction_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = transaction_id(1_700_000_000_000, &mut rng);
        assert!(id.starts_with("TXN1700000000000"));
        assert_eq!(id.len(), "TXN1700000000000".len() + 9);
        assert!(id[16..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_verify_webhook() {
        let body = json!({
            "code": "PAYMENT_SUCCESS",
            "data": {
                "merchantTransactionId": "TXN1",
                "merchantUserId": "user-1",
                "state": "COMPLETED",
                "amount": 29900
            }
        });
        let encoded = BASE64.encode(serde_json::to_vec(&body).unwrap());
        let header = checksum(&encoded, WEBHOOK_ENDPOINT, "salt", "1");

        let status = client().verify_webhook(&encoded, Some(&header)).unwrap();
        assert!(status.is_completed());
        assert_eq!(status.merchant_user_id.as_deref(), Some("user-1"));
        assert_eq!(status.amount, Some(29900));
    }

    #[test]
    fn test_verify_webhook_rejects_bad_checksum() {
        let encoded = BASE64.encode(b"{}");
        let result = client().verify_webhook(&encoded, Some("deadbeef###1"));
        assert!(matches!(result, Err(StyloError::Validation(_))));
        assert!(client().verify_webhook(&encoded, None).is_err());
    }

    #[test]
    fn test_unconfigured() {
        let client = PhonePeClient::new(reqwest::Client::new(), PhonePeConfig::default());
        assert!(!client.is_configured());
        assert!(matches!(
            client.verify_webhook("x", None),
            Err(StyloError::NotConfigured(_))
        ));
    }
}
