//! 兼容度评分
//!
//! 纯函数：同样的输入永远得到同样的评分，时钟由调用方传入。
//! 输入不完整时降级为中性子分，绝不因脏数据让整个周期失败。
//! 评分说明面向司机渠道，使用葡语文案。

use chrono::{DateTime, Utc};

use dispatch_core::models::{
    AvailabilityRecord, AvailabilityState, CompatibilityScore, CompatibilityTier, Driver,
    ScoreBreakdown, ScoreJustification, Shipment,
};

use crate::geo::{estimate_distance_km, LocationRef};

/// 车型与货物品类的亲和表
///
/// 车型关键词命中后，货物命中对应品类关键词记为精确匹配。
const EQUIPMENT_AFFINITY: &[(&str, &[&str])] = &[
    (
        "graneleiro",
        &["grao", "graos", "soja", "milho", "farelo", "granel"],
    ),
    (
        "bau",
        &["carga seca", "caixa", "caixas", "embalado", "eletronico"],
    ),
    (
        "frigorifico",
        &["congelado", "resfriado", "perecivel", "carne", "frango"],
    ),
    ("tanque", &["liquido", "combustivel", "etanol", "quimico"]),
    (
        "prancha",
        &["maquina", "maquinas", "equipamento", "container"],
    ),
    ("cacamba", &["areia", "brita", "entulho", "minerio"]),
];

/// 计算一对货单×司机的兼容度评分
pub fn score_pair(
    shipment: &Shipment,
    driver: &Driver,
    availability: Option<&AvailabilityRecord>,
    now: DateTime<Utc>,
) -> CompatibilityScore {
    let (availability_score, availability_note, hours_until_available) =
        score_availability(availability, now);
    let (equipment_score, equipment_note, mut warnings) = score_equipment(shipment, driver);
    let (location_score, location_note, distance_km) =
        score_location(shipment, driver, availability);
    let (history_score, history_note) = score_history(shipment, driver);
    let (commercial_score, commercial_note, commercial_warning) = score_commercial(driver);
    if let Some(warning) = commercial_warning {
        warnings.push(warning);
    }

    let breakdown = ScoreBreakdown {
        availability: availability_score,
        equipment: equipment_score,
        location: location_score,
        history: history_score,
        commercial: commercial_score,
    };
    let total = breakdown.weighted_total();

    CompatibilityScore {
        total,
        tier: CompatibilityTier::from_total(total),
        breakdown,
        justification: ScoreJustification {
            availability: availability_note,
            equipment: equipment_note,
            location: location_note,
            history: history_note,
            commercial: commercial_note,
            warnings,
        },
        distance_km,
        hours_until_available,
    }
}

/// 可用性子分：available 满分，returning 按距可用小时数分档，其余 0
fn score_availability(
    availability: Option<&AvailabilityRecord>,
    now: DateTime<Utc>,
) -> (f64, String, Option<f64>) {
    let Some(record) = availability else {
        return (0.0, "Sem disponibilidade registrada".to_string(), None);
    };
    match record.state {
        AvailabilityState::Available => {
            (100.0, "Motorista disponível agora".to_string(), None)
        }
        AvailabilityState::Returning => match record.hours_until_available(now) {
            Some(hours) if hours <= 0.0 => (
                100.0,
                "Retorno concluído, motorista disponível".to_string(),
                Some(hours),
            ),
            Some(hours) => {
                let score = if hours <= 2.0 {
                    90.0
                } else if hours <= 6.0 {
                    70.0
                } else if hours <= 12.0 {
                    50.0
                } else {
                    30.0
                };
                (
                    score,
                    format!("Retorna em aproximadamente {:.0} h", hours.ceil()),
                    Some(hours),
                )
            }
            None => (
                0.0,
                "Retornando sem previsão de disponibilidade".to_string(),
                None,
            ),
        },
        AvailabilityState::Unavailable => {
            (0.0, "Motorista indisponível no momento".to_string(), None)
        }
    }
}

/// 装备子分：基础 50，品类精确匹配 +30 否则泛化 +10，载重不足 -30
fn score_equipment(shipment: &Shipment, driver: &Driver) -> (f64, String, Vec<String>) {
    let mut score: f64 = 50.0;
    let mut warnings = Vec::new();

    let note = match driver.vehicle_type.as_deref() {
        Some(vehicle) => {
            if is_exact_equipment_match(&shipment.product, vehicle) {
                score += 30.0;
                "Veículo compatível com o tipo de carga".to_string()
            } else {
                score += 10.0;
                "Veículo sem afinidade específica com a carga".to_string()
            }
        }
        None => "Tipo de veículo não informado".to_string(),
    };

    if let Some(capacity) = driver.capacity_kg {
        if capacity < shipment.weight_kg {
            score -= 30.0;
            warnings.push(format!(
                "Capacidade declarada ({:.0} kg) abaixo do peso da carga ({:.0} kg)",
                capacity, shipment.weight_kg
            ));
        }
    }

    (score.clamp(0.0, 100.0), note, warnings)
}

fn is_exact_equipment_match(product: &str, vehicle: &str) -> bool {
    let product = normalize(product);
    let vehicle = normalize(vehicle);
    EQUIPMENT_AFFINITY.iter().any(|(vehicle_kind, cargo_kinds)| {
        vehicle.contains(vehicle_kind)
            && cargo_kinds.iter().any(|kind| product.contains(kind))
    })
}

/// 位置子分：按到货源地的直线距离分档，距离未知取中性 50
fn score_location(
    shipment: &Shipment,
    driver: &Driver,
    availability: Option<&AvailabilityRecord>,
) -> (f64, String, Option<f64>) {
    let origin = LocationRef::Place(&shipment.origin);
    let driver_position = driver_position(driver, availability);

    let distance = driver_position.and_then(|position| estimate_distance_km(&position, &origin));

    match distance {
        Some(km) => {
            let score = if km <= 50.0 {
                100.0
            } else if km <= 100.0 {
                90.0
            } else if km <= 300.0 {
                70.0
            } else if km <= 500.0 {
                50.0
            } else if km <= 1000.0 {
                30.0
            } else {
                10.0
            };
            (score, format!("A {:.0} km da origem da carga", km), Some(km))
        }
        None => (
            50.0,
            "Distância até a origem desconhecida".to_string(),
            None,
        ),
    }
}

/// 司机位置的解析顺序：上报坐标 → 上报位置文本 → 注册城市
fn driver_position<'a>(
    driver: &'a Driver,
    availability: Option<&'a AvailabilityRecord>,
) -> Option<LocationRef<'a>> {
    if let Some(record) = availability {
        if let Some((lat, lon)) = record.coordinates() {
            return Some(LocationRef::Coordinates(lat, lon));
        }
        if let Some(location) = record.location.as_deref() {
            if !location.trim().is_empty() {
                return Some(LocationRef::Place(location));
            }
        }
    }
    driver.home_city().map(LocationRef::Place)
}

/// 历史子分：基础 50，按完成趟数和接单率加减，目的地经验 +15
fn score_history(shipment: &Shipment, driver: &Driver) -> (f64, String) {
    let mut score: f64 = 50.0;
    let mut parts = vec![format!("{} viagens concluídas", driver.completed_trips)];

    score += match driver.completed_trips {
        t if t > 100 => 20.0,
        t if t > 50 => 15.0,
        t if t > 20 => 10.0,
        t if t > 5 => 5.0,
        _ => 0.0,
    };

    if let Some(rate) = driver.acceptance_rate {
        if rate > 80.0 {
            score += 15.0;
        } else if rate > 60.0 {
            score += 10.0;
        } else if rate < 40.0 {
            score -= 10.0;
        }
        parts.push(format!("aceitação de {:.0}%", rate));
    }

    if driver.has_destination_experience(&shipment.destination) {
        score += 15.0;
        parts.push(format!("já atendeu {}", shipment.destination));
    }

    (score.clamp(0.0, 100.0), parts.join(", "))
}

/// 商务子分：基础 50，审核通过 +50，明确未通过 -30 并告警
fn score_commercial(driver: &Driver) -> (f64, String, Option<String>) {
    match driver.approved {
        Some(true) => (
            100.0,
            "Aprovado na análise comercial".to_string(),
            None,
        ),
        Some(false) => (
            20.0,
            "Reprovado na análise comercial".to_string(),
            Some("Motorista sem aprovação comercial vigente".to_string()),
        ),
        None => (50.0, "Análise comercial pendente".to_string(), None),
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
