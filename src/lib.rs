//! # Only GAT
//!
//! `only_gat`项目用纯rust实现[图注意力网络（GAT）](https://arxiv.org/abs/1710.10903)：
//! 节点特征投影、边上的注意力打分、按目标节点分组的softmax归一化以及加权聚合，
//! 并在一个轻量的反向传播计算图上完成多头封装与两层分类模型的训练。
//!

pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
pub mod topology;
pub mod train;
