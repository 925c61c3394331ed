//! 训练过程的错误类型

use thiserror::Error;

use crate::data::DataError;
use crate::nn::GraphError;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("训练配置错误: {0}")]
    Config(String),

    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
