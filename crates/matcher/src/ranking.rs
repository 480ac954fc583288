//! 候选排序与筛选

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use dispatch_core::config::MatchingConfig;
use dispatch_core::models::{
    AvailabilityRecord, CompatibilityScore, CompatibilityTier, Driver, Shipment,
};

use crate::scorer::score_pair;

/// 进入派单序列的候选司机
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub driver: Driver,
    pub score: CompatibilityScore,
}

/// 为一票货单生成有序候选列表
///
/// 对全部活跃司机评分，按总分降序（同分按司机 id 升序保证确定性），
/// 过滤低于门槛的候选；high_compatibility_only 开启时若无 high 档
/// 候选则整单跳过；最后截断到单周期报价上限。
pub fn rank_candidates(
    shipment: &Shipment,
    drivers: &[Driver],
    availability: &HashMap<Uuid, AvailabilityRecord>,
    config: &MatchingConfig,
    now: DateTime<Utc>,
) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = drivers
        .iter()
        .filter(|driver| driver.is_active())
        .map(|driver| RankedCandidate {
            score: score_pair(shipment, driver, availability.get(&driver.id), now),
            driver: driver.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total
            .cmp(&a.score.total)
            .then_with(|| a.driver.id.cmp(&b.driver.id))
    });

    candidates.retain(|candidate| candidate.score.total >= config.score_minimum);

    if config.high_compatibility_only
        && !candidates
            .iter()
            .any(|candidate| candidate.score.tier == CompatibilityTier::High)
    {
        debug!(
            "货单 {} 在高兼容模式下没有 high 档候选，整单跳过",
            shipment.id
        );
        return Vec::new();
    }

    candidates.truncate(config.max_offers_per_shipment);
    candidates
}
