//! 消息（Message）
//!
//! 出箱记录最终以消息的形式交给传输层：
//! - `MessageProducer`：发送消息；
//! - `MessageConsumer`：处理收到的消息。
//!
//! 事件到消息体的编码由调用方决定，这里只约定消息结构。
//!
use crate::error::AppResult;
use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 消息结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// 消息体
    #[builder(default)]
    pub body: Value,
    /// 消息头
    #[builder(default)]
    pub headers: Map<String, Value>,
    /// 附加参数（路由键、分区等）
    #[builder(default)]
    pub additional_params: Map<String, Value>,
}

impl Message {
    /// 以可序列化的载荷作为消息体
    pub fn from_body<T: Serialize>(body: &T) -> AppResult<Self> {
        Ok(Self::builder().body(serde_json::to_value(body)?).build())
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(key)
    }
}

/// 消息生产者
#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn produce_message(&self, message: &Message) -> AppResult<()>;
}

/// 消息消费者
#[async_trait]
pub trait MessageConsumer: Send + Sync {
    async fn consume_message(&self, message: Message) -> AppResult<()>;
}
