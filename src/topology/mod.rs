/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 图拓扑：固定节点数与有向边表，并按目标节点预先分组入边，
 *                 供注意力打分、分组softmax与加权聚合直接按组遍历
 */

mod error;

#[cfg(test)]
mod tests;

pub use error::TopologyError;

/// 有向图的边表（COO格式）
///
/// - 节点集合为`{0..num_nodes-1}`
/// - 第`k`条边为`(src[k], dst[k])`，消息从`src`流向`dst`
/// - 不会隐式添加自环，需要时调用[`EdgeIndex::with_self_loops`]
///
/// 构造时即校验所有节点编号，因此之后的计算无需再做越界检查。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeIndex {
    num_nodes: usize,
    src: Vec<usize>,
    dst: Vec<usize>,
    /// 第`i`个元素为所有以节点`i`为目标的边编号，按边在边表中出现的顺序排列
    incoming: Vec<Vec<usize>>,
}

impl EdgeIndex {
    /// 由`(src, dst)`二元组列表创建
    pub fn new(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self, TopologyError> {
        let (src, dst) = edges.iter().copied().unzip();
        Self::from_coo(num_nodes, src, dst)
    }

    /// 由两个等长的源/目标节点列表创建
    pub fn from_coo(num_nodes: usize, src: Vec<usize>, dst: Vec<usize>) -> Result<Self, TopologyError> {
        if src.len() != dst.len() {
            return Err(TopologyError::LengthMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }

        let mut incoming = vec![Vec::new(); num_nodes];
        for (edge, (&s, &d)) in src.iter().zip(dst.iter()).enumerate() {
            for node in [s, d] {
                if node >= num_nodes {
                    return Err(TopologyError::InvalidGraphReference {
                        edge,
                        node,
                        num_nodes,
                    });
                }
            }
            incoming[d].push(edge);
        }

        Ok(Self {
            num_nodes,
            src,
            dst,
            incoming,
        })
    }

    /// 由无向边列表创建：每条`(u, v)`展开为`(u, v)`与`(v, u)`两条有向边（`u == v`时只保留一条）
    pub fn undirected(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self, TopologyError> {
        let directed = edges
            .iter()
            .flat_map(|&(u, v)| {
                if u == v {
                    vec![(u, v)]
                } else {
                    vec![(u, v), (v, u)]
                }
            })
            .collect::<Vec<_>>();
        Self::new(num_nodes, &directed)
    }

    /// 返回为每个尚无自环的节点追加一条自环`(i, i)`后的新边表
    pub fn with_self_loops(&self) -> Self {
        let mut src = self.src.clone();
        let mut dst = self.dst.clone();
        let mut incoming = self.incoming.clone();
        for node in 0..self.num_nodes {
            let has_loop = self.incoming[node].iter().any(|&e| self.src[e] == node);
            if !has_loop {
                incoming[node].push(src.len());
                src.push(node);
                dst.push(node);
            }
        }
        Self {
            num_nodes: self.num_nodes,
            src,
            dst,
            incoming,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    pub fn src(&self) -> &[usize] {
        &self.src
    }

    pub fn dst(&self) -> &[usize] {
        &self.dst
    }

    /// 第`k`条边的`(src, dst)`
    pub fn edge(&self, k: usize) -> (usize, usize) {
        (self.src[k], self.dst[k])
    }

    /// 以`node`为目标的所有入边编号，即该节点的邻域`N(node)`
    pub fn incoming(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.incoming[node].len()
    }

    /// 没有任何入边的节点。这些节点聚合后的特征恒为零向量
    pub fn isolated_nodes(&self) -> Vec<usize> {
        (0..self.num_nodes)
            .filter(|&i| self.incoming[i].is_empty())
            .collect()
    }
}
