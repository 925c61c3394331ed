/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 负责图注意力网络（GAT）的构建：计算图、节点、层、模型与优化器
 */

pub mod functional;
mod graph;
mod init;
pub mod layer;
mod model;
mod module;
mod nodes;
pub mod optimizer;

pub use graph::{Graph, GraphError};
pub use init::Init;
pub use layer::{GatLayer, HeadMerge, MultiHeadGat};
pub use model::{GatConfig, GatModel};
pub use module::Module;
pub use nodes::NodeId;

#[cfg(test)]
mod tests;
