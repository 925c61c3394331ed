/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 优化器模块，按节点梯度原地更新计算图中的参数
 */

mod adam;
mod base;
mod sgd;

pub use adam::Adam;
pub use base::Optimizer;
pub use sgd::SGD;
