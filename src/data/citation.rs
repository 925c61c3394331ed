/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : 合成引文图数据集（planted partition）
 */

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DataError;
use super::transforms::{one_hot, row_normalize};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 合成数据集的生成参数
///
/// 默认值模拟一个缩小版的 Cora：稀疏词袋特征、同类之间引用更密集、
/// 每类 20 个训练节点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub num_nodes: usize,
    pub num_classes: usize,
    /// 词表大小（特征宽度）。每个类别占其中连续的一段“主题词”
    pub num_features: usize,
    /// 每篇论文出现的词数
    pub words_per_node: usize,
    /// 一个词取自本类主题词的概率，其余从整个词表中均匀抽取
    pub topic_affinity: f32,
    /// 同类节点之间存在引用的概率
    pub p_intra: f32,
    /// 异类节点之间存在引用的概率
    pub p_inter: f32,
    /// 是否为每个节点添加自环
    pub self_loops: bool,
    pub train_per_class: usize,
    pub num_val: usize,
    pub num_test: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_nodes: 300,
            num_classes: 3,
            num_features: 60,
            words_per_node: 8,
            topic_affinity: 0.7,
            p_intra: 0.04,
            p_inter: 0.004,
            self_loops: true,
            train_per_class: 20,
            num_val: 60,
            num_test: 120,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.num_classes == 0 || self.num_features < self.num_classes {
            return Err(DataError::InvalidConfig(format!(
                "词表大小{}须不小于类别数{}且类别数须大于0",
                self.num_features, self.num_classes
            )));
        }
        if self.words_per_node == 0 {
            return Err(DataError::InvalidConfig("每个节点至少需要1个词".to_string()));
        }
        for (name, p) in [
            ("topic_affinity", self.topic_affinity),
            ("p_intra", self.p_intra),
            ("p_inter", self.p_inter),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DataError::InvalidConfig(format!("{name}须在[0, 1]内，但得到{p}")));
            }
        }
        if self.train_per_class == 0 {
            return Err(DataError::InvalidConfig("每类至少需要1个训练节点".to_string()));
        }
        let required = self.train_per_class * self.num_classes + self.num_val + self.num_test;
        if required > self.num_nodes {
            return Err(DataError::InvalidConfig(format!(
                "训练/验证/测试集共需{required}个节点，但只有{}个",
                self.num_nodes
            )));
        }
        Ok(())
    }
}

/// 节点分类数据集：特征、标签、引用图与三个互不相交的节点掩码
#[derive(Debug, Clone)]
pub struct CitationDataset {
    features: Tensor,
    labels: Vec<usize>,
    labels_one_hot: Tensor,
    num_classes: usize,
    edges: Arc<EdgeIndex>,
    train_mask: Vec<usize>,
    val_mask: Vec<usize>,
    test_mask: Vec<usize>,
}

impl CitationDataset {
    /// 由已有数据组装，检查各部分彼此一致
    pub fn new(
        features: Tensor,
        labels: Vec<usize>,
        num_classes: usize,
        edges: EdgeIndex,
        train_mask: Vec<usize>,
        val_mask: Vec<usize>,
        test_mask: Vec<usize>,
    ) -> Result<Self, DataError> {
        let n = features.rows();
        if labels.len() != n || edges.num_nodes() != n {
            return Err(DataError::ShapeMismatch {
                expected: vec![n],
                got: vec![labels.len(), edges.num_nodes()],
            });
        }
        let labels_one_hot = one_hot(&labels, num_classes)?;
        for &node in train_mask.iter().chain(&val_mask).chain(&test_mask) {
            if node >= n {
                return Err(DataError::IndexOutOfBounds { index: node, len: n });
            }
        }
        if train_mask.is_empty() {
            return Err(DataError::InvalidConfig("训练掩码不能为空".to_string()));
        }
        Ok(Self {
            features,
            labels,
            labels_one_hot,
            num_classes,
            edges: Arc::new(edges),
            train_mask,
            val_mask,
            test_mask,
        })
    }

    /// 以给定种子生成合成数据集，相同的配置与种子得到完全相同的数据
    pub fn synthetic(config: &SyntheticConfig, seed: u64) -> Result<Self, DataError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let n = config.num_nodes;

        // 节点按类别轮流分配标签
        let labels = (0..n).map(|i| i % config.num_classes).collect::<Vec<_>>();
        let features = row_normalize(&Self::bag_of_words(config, &labels, &mut rng));

        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let p = if labels[i] == labels[j] {
                    config.p_intra
                } else {
                    config.p_inter
                };
                if rng.r#gen::<f32>() < p {
                    pairs.push((i, j));
                }
            }
        }
        let mut edges = EdgeIndex::undirected(n, &pairs)?;
        if config.self_loops {
            edges = edges.with_self_loops();
        }
        let isolated = edges.isolated_nodes().len();
        if isolated > 0 {
            warn!(isolated, "合成图中有节点没有任何入边，其GAT输出将为零向量");
        }

        let (train_mask, val_mask, test_mask) = Self::split(config, &labels);
        let dataset = Self::new(
            features,
            labels,
            config.num_classes,
            edges,
            train_mask,
            val_mask,
            test_mask,
        )?;
        info!(
            nodes = n,
            edges = dataset.edges.num_edges(),
            classes = config.num_classes,
            features = config.num_features,
            train = dataset.train_mask.len(),
            val = dataset.val_mask.len(),
            test = dataset.test_mask.len(),
            "合成引文数据集已生成"
        );
        Ok(dataset)
    }

    /// 类别c的主题词为第`c*block..(c+1)*block`列
    fn bag_of_words(config: &SyntheticConfig, labels: &[usize], rng: &mut StdRng) -> Tensor {
        let block = config.num_features / config.num_classes;
        let mut words = Tensor::zeros(&[labels.len(), config.num_features]);
        for (i, &label) in labels.iter().enumerate() {
            for _ in 0..config.words_per_node {
                let word = if rng.r#gen::<f32>() < config.topic_affinity {
                    label * block + rng.gen_range(0..block)
                } else {
                    rng.gen_range(0..config.num_features)
                };
                words[[i, word]] = 1.0;
            }
        }
        words
    }

    /// 训练集：每类最先出现的`train_per_class`个节点；其余节点按编号依次划入验证集、测试集
    fn split(config: &SyntheticConfig, labels: &[usize]) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        let mut per_class = vec![0; config.num_classes];
        let mut train = Vec::new();
        let mut rest = Vec::new();
        for (node, &label) in labels.iter().enumerate() {
            if per_class[label] < config.train_per_class {
                per_class[label] += 1;
                train.push(node);
            } else {
                rest.push(node);
            }
        }
        let val = rest[..config.num_val].to_vec();
        let test = rest[config.num_val..config.num_val + config.num_test].to_vec();
        (train, val, test)
    }

    pub fn features(&self) -> &Tensor {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// 标签的 one-hot 编码，[N, num_classes]
    pub fn labels_one_hot(&self) -> &Tensor {
        &self.labels_one_hot
    }

    pub fn edges(&self) -> &Arc<EdgeIndex> {
        &self.edges
    }

    pub fn num_nodes(&self) -> usize {
        self.features.rows()
    }

    pub fn num_features(&self) -> usize {
        self.features.cols()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn train_mask(&self) -> &[usize] {
        &self.train_mask
    }

    pub fn val_mask(&self) -> &[usize] {
        &self.val_mask
    }

    pub fn test_mask(&self) -> &[usize] {
        &self.test_mask
    }
}
