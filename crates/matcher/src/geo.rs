//! 直线距离估算
//!
//! 只做大圆距离，不做路径规划。坐标缺失时降级到内置的
//! 城市坐标表；两侧都解析不出来返回 None，由评分侧按中性分处理。

const EARTH_RADIUS_KM: f64 = 6371.0;

/// 主要城市坐标表，覆盖货源集中的巴西城市
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("sao paulo", -23.5505, -46.6333),
    ("rio de janeiro", -22.9068, -43.1729),
    ("belo horizonte", -19.9167, -43.9345),
    ("curitiba", -25.4284, -49.2733),
    ("porto alegre", -30.0346, -51.2177),
    ("salvador", -12.9777, -38.5016),
    ("brasilia", -15.7939, -47.8828),
    ("fortaleza", -3.7319, -38.5267),
    ("recife", -8.0476, -34.8770),
    ("goiania", -16.6869, -49.2648),
    ("campinas", -22.9099, -47.0626),
    ("manaus", -3.1190, -60.0217),
    ("belem", -1.4558, -48.4902),
    ("uberlandia", -18.9113, -48.2622),
    ("ribeirao preto", -21.1775, -47.8103),
    ("cuiaba", -15.6014, -56.0979),
    ("campo grande", -20.4697, -54.6201),
    ("londrina", -23.3045, -51.1696),
    ("joinville", -26.3045, -48.8487),
    ("santos", -23.9608, -46.3336),
    ("sorocaba", -23.5015, -47.4526),
    ("maringa", -23.4205, -51.9333),
];

/// 位置引用：优先精确坐标，其次自由文本城市名
#[derive(Debug, Clone)]
pub enum LocationRef<'a> {
    Coordinates(f64, f64),
    Place(&'a str),
}

impl LocationRef<'_> {
    fn resolve(&self) -> Option<(f64, f64)> {
        match self {
            LocationRef::Coordinates(lat, lon) => Some((*lat, *lon)),
            LocationRef::Place(name) => lookup_city(name),
        }
    }
}

/// 哈弗辛公式计算两点间大圆距离（公里）
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// 估算两地直线距离
///
/// 任一侧无法解析时返回 None，调用方不得视为失败。
pub fn estimate_distance_km(origin: &LocationRef, destination: &LocationRef) -> Option<f64> {
    let (lat1, lon1) = origin.resolve()?;
    let (lat2, lon2) = destination.resolve()?;
    Some(haversine_km(lat1, lon1, lat2, lon2))
}

/// 按规范化后的城市名查表
pub fn lookup_city(name: &str) -> Option<(f64, f64)> {
    let normalized = normalize_city(name);
    if normalized.is_empty() {
        return None;
    }
    CITY_COORDINATES
        .iter()
        .find(|(city, _, _)| *city == normalized)
        .map(|(_, lat, lon)| (*lat, *lon))
}

/// 规范化城市名：小写、去重音、截掉 "cidade - UF" / "cidade/UF" 的州后缀
fn normalize_city(name: &str) -> String {
    let base = name
        .split(['-', '/', ','])
        .next()
        .unwrap_or(name)
        .trim()
        .to_lowercase();
    base.chars()
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
