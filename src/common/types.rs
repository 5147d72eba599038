//! ドメインモデル
//!
//! AIプロファイル、AI判定、判定監査ログ、データ同意、訂正リクエスト。
//! User以外のすべてのエンティティはちょうど1人のユーザーに所有される。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// AI判定種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// ローン審査否決
    LoanDenied,
    /// 不正利用アラート
    FraudAlert,
    /// カード事前承認
    CardPreApproval,
}

impl DecisionType {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::LoanDenied => "loan_denied",
            DecisionType::FraudAlert => "fraud_alert",
            DecisionType::CardPreApproval => "card_pre_approval",
        }
    }

    /// DB文字列からの復元
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "loan_denied" => Some(DecisionType::LoanDenied),
            "fraud_alert" => Some(DecisionType::FraudAlert),
            "card_pre_approval" => Some(DecisionType::CardPreApproval),
            _ => None,
        }
    }
}

/// AI推論プロファイル
///
/// 固定語彙から抽出されたラベルと65〜95の信頼度を持つ。
/// 初回読み取り時に最大3件まとめてシードされ、以後更新されない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProfile {
    /// プロファイルID
    pub id: Uuid,
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// 推論ラベル
    pub label: String,
    /// 信頼度（65〜95）
    pub confidence: i64,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// AI判定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    /// 判定ID
    pub id: Uuid,
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// 判定種別
    pub decision_type: DecisionType,
    /// 判定文（顧客向け）
    pub decision_text: String,
    /// 説明文（顧客向け）
    pub explanation: String,
    /// モデルバージョン（v{1-3}.{0-4}形式）
    pub model_version: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// 判定監査ログ
///
/// 追記専用: 生成された判定1件につきちょうど1件、生成時に書き込まれる。
/// 更新・削除操作は存在しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAuditLog {
    /// 監査ログID
    pub id: Uuid,
    /// 対象のAI判定ID
    pub ai_decision_id: Uuid,
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// モデルバージョン
    pub model_version: String,
    /// 特徴量ハッシュ（32文字hex、監査参照専用の不透明値）
    pub features_hash: String,
    /// 説明可能性ペイロード（特徴量重み、しきい値、予測スコア）
    pub raw_explainability: serde_json::Value,
    /// 顧客が異議申し立てしたか
    pub customer_appealed: bool,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// データ利用同意設定
///
/// ユーザーと1対1。fraud_detectionは常にtrueでロックされており、
/// クライアント入力からは決して変更されない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConsent {
    /// 同意設定ID
    pub id: Uuid,
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// 不正検知への利用（常にtrue、変更不可）
    pub fraud_detection: bool,
    /// マーケティングオファーへの利用
    pub marketing_offers: bool,
    /// 金融アドバイスへの利用
    pub financial_advice: bool,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

/// 訂正リクエストの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionStatus {
    /// 申請済み・未処理（初期状態）
    Pending,
    /// 承認済み（終端状態）
    Approved,
    /// 却下済み（終端状態）
    Rejected,
}

impl CorrectionStatus {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionStatus::Pending => "pending",
            CorrectionStatus::Approved => "approved",
            CorrectionStatus::Rejected => "rejected",
        }
    }

    /// DB文字列からの復元
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CorrectionStatus::Pending),
            "approved" => Some(CorrectionStatus::Approved),
            "rejected" => Some(CorrectionStatus::Rejected),
            _ => None,
        }
    }

    /// 終端状態（approved/rejected）かどうか
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CorrectionStatus::Pending)
    }
}

/// プロファイル訂正リクエスト
///
/// 状態機械: pending → approved | rejected。
/// 終端状態に入った後の遷移は許可されない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// 訂正リクエストID
    pub id: Uuid,
    /// 申請ユーザーID
    pub user_id: Uuid,
    /// 異議対象のAIプロファイルID
    pub ai_profile_id: Uuid,
    /// 申請時点のプロファイルラベル（スナップショット）
    pub incorrect_label: String,
    /// 希望する置換ラベル（任意の自由記述）
    pub requested_label: Option<String>,
    /// 状態
    pub status: CorrectionStatus,
    /// 管理者メモ
    pub admin_notes: Option<String>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 処理日時（終端遷移時に刻印）
    pub processed_at: Option<DateTime<Utc>>,
}
