use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{DispatchError, DispatchResult};

/// 系统配置
///
/// 不可变配置结构，启动时加载一次并传入各组件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub webhook: WebhookConfig,
    pub observability: ObservabilityConfig,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

/// 匹配与派单参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 候选司机的最低总分门槛
    pub score_minimum: i64,
    /// 每票货单单周期最多派出的报价数
    pub max_offers_per_shipment: usize,
    /// 仅在存在 high 档候选时才对该货单派单
    pub high_compatibility_only: bool,
    /// 同一货单相邻两条报价之间的间隔（分钟）
    pub offer_interval_minutes: u64,
    /// 重复报价判定的回看窗口（分钟）
    pub offer_dedup_window_minutes: i64,
    /// 待派单货单的创建时间回看窗口（分钟）
    pub shipment_lookback_minutes: i64,
    /// 单周期扫描的可用性记录上限
    pub availability_scan_limit: i64,
    /// serve 模式下两次派单周期的间隔（秒）
    pub cycle_interval_seconds: u64,
}

/// 通知 webhook 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// 未配置时跳过通知推送，报价照常落库
    pub url: Option<String>,
    pub request_timeout_seconds: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/freight".to_string(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            matching: MatchingConfig::default(),
            webhook: WebhookConfig {
                url: None,
                request_timeout_seconds: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            score_minimum: 70,
            max_offers_per_shipment: 5,
            high_compatibility_only: false,
            offer_interval_minutes: 5,
            offer_dedup_window_minutes: 60,
            shipment_lookback_minutes: 30,
            availability_scan_limit: 500,
            cycle_interval_seconds: 60,
        }
    }
}

impl MatchingConfig {
    /// 相邻报价之间的间隔
    pub fn offer_interval(&self) -> Duration {
        Duration::from_secs(self.offer_interval_minutes * 60)
    }

    /// 重复报价回看窗口
    pub fn dedup_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.offer_dedup_window_minutes)
    }

    /// 货单创建时间回看窗口
    pub fn shipment_lookback(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.shipment_lookback_minutes)
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序：内置默认值 → TOML 配置文件 → 环境变量覆盖
    /// （前缀 DISPATCH，层级分隔符 "__"）。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.url", "postgresql://localhost/freight")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connection_timeout_seconds", 30)?
            .set_default("database.idle_timeout_seconds", 600)?
            .set_default("matching.score_minimum", 70)?
            .set_default("matching.max_offers_per_shipment", 5)?
            .set_default("matching.high_compatibility_only", false)?
            .set_default("matching.offer_interval_minutes", 5)?
            .set_default("matching.offer_dedup_window_minutes", 60)?
            .set_default("matching.shipment_lookback_minutes", 30)?
            .set_default("matching.availability_scan_limit", 500)?
            .set_default("matching.cycle_interval_seconds", 60)?
            .set_default("webhook.request_timeout_seconds", 10)?
            .set_default("observability.log_level", "info")?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/dispatch.toml",
                "dispatch.toml",
                "/etc/dispatch/config.toml",
            ];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        let config = builder
            .add_source(Environment::with_prefix("DISPATCH").separator("__"))
            .build()
            .context("构建配置失败")?;

        let app_config: AppConfig = config.try_deserialize().context("解析配置失败")?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> DispatchResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(DispatchError::config_error("database.url 不能为空"));
        }
        if self.database.max_connections == 0 {
            return Err(DispatchError::config_error(
                "database.max_connections 必须大于 0",
            ));
        }
        if !(0..=100).contains(&self.matching.score_minimum) {
            return Err(DispatchError::config_error(
                "matching.score_minimum 必须在 0-100 之间",
            ));
        }
        if self.matching.max_offers_per_shipment == 0 {
            return Err(DispatchError::config_error(
                "matching.max_offers_per_shipment 必须大于 0",
            ));
        }
        if self.matching.offer_dedup_window_minutes <= 0 {
            return Err(DispatchError::config_error(
                "matching.offer_dedup_window_minutes 必须大于 0",
            ));
        }
        if self.matching.shipment_lookback_minutes <= 0 {
            return Err(DispatchError::config_error(
                "matching.shipment_lookback_minutes 必须大于 0",
            ));
        }
        if self.matching.availability_scan_limit <= 0 {
            return Err(DispatchError::config_error(
                "matching.availability_scan_limit 必须大于 0",
            ));
        }
        if self.webhook.request_timeout_seconds == 0 {
            return Err(DispatchError::config_error(
                "webhook.request_timeout_seconds 必须大于 0",
            ));
        }
        Ok(())
    }
}
