/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 含可训练参数的网络组件的公共接口
 */

use super::{Graph, GraphError, NodeId};

/// 网络组件（单头层、多头层、整个模型）
pub trait Module {
    /// 本组件持有的所有参数节点
    fn parameters(&self) -> Vec<NodeId>;

    /// 参数标量总数
    fn num_params(&self, graph: &Graph) -> Result<usize, GraphError> {
        self.parameters()
            .into_iter()
            .map(|id| graph.get_node_shape(id).map(|s| s.iter().product::<usize>()))
            .sum()
    }
}
