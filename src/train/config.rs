//! 训练配置，可由 JSON 文件加载，缺省字段取默认值

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TrainError;
use crate::data::SyntheticConfig;
use crate::nn::GatConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// Adam 的 L2 权重衰减
    pub weight_decay: f32,
    /// 每隔多少轮输出一次日志，0 表示只在结束时输出
    pub log_interval: usize,
    /// 验证集损失连续多少轮没有下降就提前停止，0 表示不提前停止
    pub patience: usize,
    /// 参数初始化与数据生成的随机种子
    pub seed: u64,
    /// `in_features`与`num_classes`为0时由数据集自动填入
    pub model: GatConfig,
    pub data: SyntheticConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 0.005,
            weight_decay: 5e-4,
            log_interval: 10,
            patience: 100,
            seed: 42,
            model: GatConfig::default(),
            data: SyntheticConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TrainError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 {
            return Err(TrainError::Config("epochs须大于0".to_string()));
        }
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(TrainError::Config(format!(
                "学习率须为正数，但得到{}",
                self.learning_rate
            )));
        }
        if self.weight_decay < 0.0 || !self.weight_decay.is_finite() {
            return Err(TrainError::Config(format!(
                "权重衰减须为非负数，但得到{}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}
