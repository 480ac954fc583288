use serde::{Deserialize, Serialize};

/// 评分权重，五项之和恒为 1.0
pub const WEIGHT_AVAILABILITY: f64 = 0.30;
pub const WEIGHT_EQUIPMENT: f64 = 0.25;
pub const WEIGHT_LOCATION: f64 = 0.20;
pub const WEIGHT_HISTORY: f64 = 0.15;
pub const WEIGHT_COMMERCIAL: f64 = 0.10;

/// 兼容度档位
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompatibilityTier {
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
}

impl CompatibilityTier {
    /// 由加权总分判定档位：≥80 高、≥60 中、其余低
    pub fn from_total(total: i64) -> Self {
        if total >= 80 {
            CompatibilityTier::High
        } else if total >= 60 {
            CompatibilityTier::Medium
        } else {
            CompatibilityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityTier::High => "high",
            CompatibilityTier::Medium => "medium",
            CompatibilityTier::Low => "low",
        }
    }
}

/// 五项子分，各自取值 [0,100]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub availability: f64,
    pub equipment: f64,
    pub location: f64,
    pub history: f64,
    pub commercial: f64,
}

impl ScoreBreakdown {
    /// 加权求和，四舍五入并钳制到 [0,100]
    pub fn weighted_total(&self) -> i64 {
        let total = self.availability * WEIGHT_AVAILABILITY
            + self.equipment * WEIGHT_EQUIPMENT
            + self.location * WEIGHT_LOCATION
            + self.history * WEIGHT_HISTORY
            + self.commercial * WEIGHT_COMMERCIAL;
        (total.round() as i64).clamp(0, 100)
    }
}

/// 评分说明，逐项一句人类可读文案（面向司机渠道，葡语）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreJustification {
    pub availability: String,
    pub equipment: String,
    pub location: String,
    pub history: String,
    pub commercial: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// 货单×司机的兼容度评分结果
///
/// 纯计算产物，本身不落库；派单时快照进报价记录和评分审计。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub total: i64,
    pub tier: CompatibilityTier,
    pub breakdown: ScoreBreakdown,
    pub justification: ScoreJustification,
    pub distance_km: Option<f64>,
    pub hours_until_available: Option<f64>,
}
