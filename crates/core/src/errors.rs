use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    #[error("仓储操作失败: {0}")]
    Repository(String),
    #[error("货单不存在: id={id}")]
    ShipmentNotFound { id: Uuid },
    #[error("司机不存在: id={id}")]
    DriverNotFound { id: Uuid },
    #[error("通知推送失败: {0}")]
    Notification(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("数据序列化错误: {0}")]
    Serialization(String),
    #[error("操作超时: {0}")]
    Timeout(String),
    #[error("系统内部错误: {0}")]
    Internal(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn repository<S: Into<String>>(msg: S) -> Self {
        Self::Repository(msg.into())
    }
    pub fn notification<S: Into<String>>(msg: S) -> Self {
        Self::Notification(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn shipment_not_found(id: Uuid) -> Self {
        Self::ShipmentNotFound { id }
    }
    pub fn driver_not_found(id: Uuid) -> Self {
        Self::DriverNotFound { id }
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::Configuration(_) | DispatchError::Internal(_)
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Repository(_)
                | DispatchError::Notification(_)
                | DispatchError::Timeout(_)
        )
    }
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        DispatchError::Repository(err.to_string())
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Internal(err.to_string())
    }
}
