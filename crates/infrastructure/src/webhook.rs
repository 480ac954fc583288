//! 报价通知 webhook
//!
//! 把单条报价事件推成一个 JSON POST，附带渲染好的司机话术。
//! 有界超时、不重试；任何非 2xx、超时或连接失败都只记日志返错，
//! 由派单引擎决定继续。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use dispatch_core::config::WebhookConfig;
use dispatch_core::traits::{OfferNotification, OfferNotifier};
use dispatch_core::{DispatchError, DispatchResult};

pub struct WebhookNotifier {
    endpoint: Option<String>,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig) -> DispatchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| DispatchError::notification(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self {
            endpoint: config.url.clone(),
            http_client,
        })
    }

    /// 组装推送载荷，字段结构与下游消息网关约定一致
    fn build_payload(notification: &OfferNotification) -> serde_json::Value {
        let shipment = &notification.shipment;
        let driver = &notification.driver;
        let score = &notification.score;

        json!({
            "type": "new_offer",
            "timestamp": Utc::now().to_rfc3339(),
            "driver": {
                "id": driver.id,
                "name": driver.name,
                "phone": driver.phone,
            },
            "shipment": {
                "id": shipment.id,
                "origin": shipment.origin,
                "destination": shipment.destination,
                "product": shipment.product,
                "weight_kg": shipment.weight_kg,
                "freight_value": shipment.freight_value,
                "pickup_date": shipment.pickup_date.to_rfc3339(),
                "urgency": shipment.urgency,
            },
            "matching": {
                "score": score.total,
                "justification": score.justification,
            },
            "suggested_message": Self::render_message(notification),
        })
    }

    /// 渲染发给司机的葡语话术
    fn render_message(notification: &OfferNotification) -> String {
        let shipment = &notification.shipment;
        let freight = match shipment.freight_value {
            Some(value) => format!("R$ {value:.2}"),
            None => "a combinar".to_string(),
        };

        format!(
            "🚛 Nova carga disponível!\n\n\
             📦 {product}\n\
             📍 Origem: {origin}\n\
             🏁 Destino: {destination}\n\
             ⚖️ Peso: {weight:.0} kg\n\
             📅 Coleta: {pickup}\n\
             💰 Frete: {freight}\n\n\
             Compatibilidade: {score}%. Responda esta mensagem para aceitar a oferta.",
            product = shipment.product,
            origin = shipment.origin,
            destination = shipment.destination,
            weight = shipment.weight_kg,
            pickup = shipment.pickup_date.format("%d/%m/%Y"),
            freight = freight,
            score = notification.score.total,
        )
    }
}

#[async_trait]
impl OfferNotifier for WebhookNotifier {
    async fn notify(&self, notification: &OfferNotification) -> DispatchResult<()> {
        let Some(ref endpoint) = self.endpoint else {
            debug!("未配置 webhook 地址，跳过通知推送");
            return Ok(());
        };

        let payload = Self::build_payload(notification);

        match self.http_client.post(endpoint).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!(
                        "报价通知已推送: 货单 {} → 司机 {}",
                        notification.shipment.id, notification.driver.id
                    );
                    Ok(())
                } else {
                    let status = response.status();
                    warn!("webhook 返回非成功状态: HTTP {}", status);
                    Err(DispatchError::notification(format!(
                        "webhook 返回 HTTP {status}"
                    )))
                }
            }
            Err(e) if e.is_timeout() => {
                warn!("webhook 请求超时: {}", e);
                Err(DispatchError::Timeout(format!("webhook 请求超时: {e}")))
            }
            Err(e) => {
                warn!("webhook 请求失败: {}", e);
                Err(DispatchError::notification(format!(
                    "webhook 请求失败: {e}"
                )))
            }
        }
    }
}
