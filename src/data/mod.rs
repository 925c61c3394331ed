//! 数据模块
//!
//! 提供节点分类数据集与数据变换功能。
//!
//! # 主要组件
//!
//! - [`CitationDataset`]: 引文图节点分类数据集（特征、标签、边表、训练/验证/测试掩码）
//! - [`SyntheticConfig`]: 合成引文图的生成参数
//! - [`transforms`]: 数据变换函数（one-hot、按行归一化）
//! - [`DataError`]: 数据集构造错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use only_gat::data::{CitationDataset, SyntheticConfig};
//!
//! let dataset = CitationDataset::synthetic(&SyntheticConfig::default(), 42)?;
//! println!("{} 个节点, {} 条边", dataset.num_nodes(), dataset.edges().num_edges());
//! ```

mod citation;
pub mod error;
pub mod transforms;


pub use citation::{CitationDataset, SyntheticConfig};
pub use error::DataError;
