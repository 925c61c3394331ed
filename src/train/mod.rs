/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : 训练驱动：配置、错误类型、评估指标与训练器
 */

mod config;
mod error;
mod metrics;
mod trainer;


pub use config::TrainConfig;
pub use error::TrainError;
pub use metrics::accuracy;
pub use trainer::{TrainReport, Trainer};
