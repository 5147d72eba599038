//! ルールベースAI生成エンジン
//!
//! 学習モデルではなく、形状は決定的・内容はランダムな生成器。
//! カンドテキストのプロファイル/判定レコードと合成説明ペイロードを作る。
//! すべて純粋関数であり、永続化は呼び出し側の責務。

use crate::common::types::DecisionType;
use rand::RngExt;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// プロファイルラベルの固定語彙（6種）
pub const PROFILE_LABELS: [&str; 6] = [
    "Frequent Traveler",
    "Saving for Car",
    "Investment Enthusiast",
    "Budget Conscious",
    "Early Adopter",
    "High Spender",
];

/// 判定テンプレート（順序固定）
const DECISION_TEMPLATES: [(DecisionType, &str, &str); 3] = [
    (
        DecisionType::LoanDenied,
        "Your loan application for $15,000 has been declined at this time.",
        "Based on our AI analysis, your current debt-to-income ratio of 47% exceeds our threshold of 40%. Additionally, recent credit inquiries and fluctuating monthly income patterns suggest higher risk. To improve approval chances, consider reducing existing debt or increasing income stability over the next 6 months.",
    ),
    (
        DecisionType::FraudAlert,
        "Suspicious transaction detected and temporarily blocked.",
        "Our fraud detection system identified an unusual transaction of $2,450 from a location 500 miles from your typical spending area, occurring at 3:15 AM - outside your normal transaction hours. The merchant category (electronics) also differs from your usual spending patterns. This triggered our fraud prevention protocol.",
    ),
    (
        DecisionType::CardPreApproval,
        "You're pre-approved for our Premium Rewards Credit Card.",
        "Based on your excellent credit score of 780+, consistent on-time payment history over 3 years, and average monthly spending of $3,200, our AI system has pre-approved you for our premium card. Your spending patterns in dining and travel categories also align well with this card's reward structure.",
    ),
];

/// 生成されたプロファイル（挿入前）
#[derive(Debug, Clone)]
pub struct GeneratedProfile {
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// 推論ラベル
    pub label: String,
    /// 信頼度（65〜95）
    pub confidence: i64,
}

/// 生成された判定（挿入前）
#[derive(Debug, Clone)]
pub struct GeneratedDecision {
    /// 所有ユーザーID
    pub user_id: Uuid,
    /// 判定種別
    pub decision_type: DecisionType,
    /// 判定文
    pub decision_text: String,
    /// 説明文
    pub explanation: String,
    /// モデルバージョン
    pub model_version: String,
}

/// AIプロファイルを生成
///
/// 固定6ラベル語彙から重複なしで`count`件（上限は語彙サイズ）を抽出し、
/// それぞれに[65, 95]の一様乱数の信頼度を割り当てる。
pub fn generate_profiles(user_id: Uuid, count: usize) -> Vec<GeneratedProfile> {
    let mut rng = rand::rng();
    let mut used: Vec<&str> = Vec::new();
    let mut profiles = Vec::new();

    while profiles.len() < count.min(PROFILE_LABELS.len()) {
        let label = PROFILE_LABELS[rng.random_range(0..PROFILE_LABELS.len())];
        if used.contains(&label) {
            continue;
        }
        used.push(label);
        profiles.push(GeneratedProfile {
            user_id,
            label: label.to_string(),
            confidence: rng.random_range(65..=95),
        });
    }

    profiles
}

/// AI判定を生成
///
/// 固定順序の3テンプレート（loan_denied, fraud_alert, card_pre_approval）を
/// 先頭から`count`件（上限3）たどり、`v{1-3}.{0-4}`形式のランダムな
/// モデルバージョンを付与する。
pub fn generate_decisions(user_id: Uuid, count: usize) -> Vec<GeneratedDecision> {
    let mut rng = rand::rng();

    DECISION_TEMPLATES
        .iter()
        .take(count.min(DECISION_TEMPLATES.len()))
        .map(|(decision_type, text, explanation)| GeneratedDecision {
            user_id,
            decision_type: *decision_type,
            decision_text: text.to_string(),
            explanation: explanation.to_string(),
            model_version: format!(
                "v{}.{}",
                rng.random_range(1..=3),
                rng.random_range(0..=4)
            ),
        })
        .collect()
}

/// 特徴量ハッシュを生成
///
/// ユーザーID・判定種別・現在時刻の連結のSHA-256先頭32文字（hex）。
/// 監査参照専用の不透明値であり、検索・検証には使わない。
pub fn features_hash(user_id: Uuid, decision_type: DecisionType) -> String {
    let data = format!(
        "{}-{}-{}",
        user_id,
        decision_type.as_str(),
        chrono::Utc::now().timestamp_millis()
    );
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)[..32].to_string()
}

/// 説明可能性ペイロードを生成
///
/// 判定種別ごとの固定特徴量重みテーブル（しきい値・予測スコア付き）。
/// 実際の特徴量から計算されるものではない静的データ。
pub fn raw_explainability(decision_type: DecisionType) -> serde_json::Value {
    match decision_type {
        DecisionType::LoanDenied => serde_json::json!({
            "features": {
                "debt_to_income_ratio": -0.35,
                "credit_score": 0.12,
                "income_stability": -0.18,
                "recent_inquiries": -0.22,
                "payment_history": 0.08,
            },
            "threshold": 0.5,
            "prediction": 0.32,
        }),
        DecisionType::FraudAlert => serde_json::json!({
            "features": {
                "location_anomaly": 0.45,
                "time_anomaly": 0.38,
                "amount_deviation": 0.28,
                "merchant_category_mismatch": 0.25,
                "velocity_check": 0.15,
            },
            "threshold": 0.7,
            "prediction": 0.89,
        }),
        DecisionType::CardPreApproval => serde_json::json!({
            "features": {
                "credit_score": 0.42,
                "payment_history": 0.38,
                "spending_patterns": 0.25,
                "account_age": 0.18,
                "income_level": 0.22,
            },
            "threshold": 0.6,
            "prediction": 0.85,
        }),
    }
}
