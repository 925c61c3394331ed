/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : 全图（transductive）节点分类训练器
 */

use std::path::Path;

use tracing::{debug, info};

use super::{TrainConfig, TrainError, accuracy};
use crate::data::{CitationDataset, DataError};
use crate::nn::optimizer::{Adam, Optimizer};
use crate::nn::{GatModel, Graph, Module, NodeId};
use crate::tensor::Tensor;

/// 一次`fit`的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs_run: usize,
    /// 每轮更新前的训练损失
    pub train_losses: Vec<f32>,
    /// 每轮更新后的验证损失（没有验证集时为空）
    pub val_losses: Vec<f32>,
    /// 验证损失最低的轮次（从1计）；没有验证集时为最后一轮
    pub best_epoch: usize,
    pub train_accuracy: f32,
    pub val_accuracy: f32,
    pub test_accuracy: f32,
}

/// 训练器：计算图只在创建时搭建一次，之后每轮只做前向、反向与参数更新
pub struct Trainer {
    config: TrainConfig,
    dataset: CitationDataset,
    graph: Graph,
    model: GatModel,
    logits: NodeId,
    train_loss: NodeId,
    val_loss: Option<NodeId>,
    optimizer: Adam,
}

impl Trainer {
    pub fn new(mut config: TrainConfig, dataset: &CitationDataset) -> Result<Self, TrainError> {
        config.validate()?;
        fill_dimension("in_features", &mut config.model.in_features, dataset.num_features())?;
        fill_dimension("num_classes", &mut config.model.num_classes, dataset.num_classes())?;

        let mut graph = Graph::new_with_seed(config.seed);
        let input = graph.new_input_node(dataset.features().shape(), Some("features"))?;
        let labels = graph.new_input_node(dataset.labels_one_hot().shape(), Some("labels"))?;
        graph.set_node_value(input, Some(dataset.features()))?;
        graph.set_node_value(labels, Some(dataset.labels_one_hot()))?;

        let mut model = GatModel::new(&mut graph, dataset.edges(), &config.model)?;
        let logits = model.forward(&mut graph, input)?;
        let train_loss =
            graph.new_masked_cross_entropy_node(logits, labels, dataset.train_mask(), Some("train_loss"))?;
        let val_loss = if dataset.val_mask().is_empty() {
            None
        } else {
            Some(graph.new_masked_cross_entropy_node(logits, labels, dataset.val_mask(), Some("val_loss"))?)
        };

        let optimizer = Adam::with_params(&model.parameters(), config.learning_rate, 0.9, 0.999, 1e-8)?
            .with_weight_decay(config.weight_decay);

        info!(
            params = model.num_params(&graph)?,
            nodes = graph.nodes_count(),
            "GAT训练器已创建"
        );
        Ok(Self {
            config,
            dataset: dataset.clone(),
            graph,
            model,
            logits,
            train_loss,
            val_loss,
            optimizer,
        })
    }

    /// 训练`epochs`轮；设置了`patience`且有验证集时，验证损失长期不降会提前停止，
    /// 并恢复验证损失最低时的参数
    pub fn fit(&mut self) -> Result<TrainReport, TrainError> {
        let mut train_losses = Vec::with_capacity(self.config.epochs);
        let mut val_losses = Vec::new();
        let mut best: Option<(f32, usize, Vec<u8>)> = None;

        for epoch in 1..=self.config.epochs {
            let loss = self.optimizer.minimize(&mut self.graph, self.train_loss)?;
            train_losses.push(loss);

            let Some(val_loss_id) = self.val_loss else {
                self.log_epoch(epoch, loss, None)?;
                continue;
            };
            self.graph.forward_node(val_loss_id)?;
            let val_loss = self.scalar(val_loss_id)?;
            val_losses.push(val_loss);
            self.log_epoch(epoch, loss, Some(val_loss))?;

            let improved = best.as_ref().is_none_or(|(best_loss, _, _)| val_loss < *best_loss);
            if improved {
                let mut snapshot = Vec::new();
                self.graph.write_params(&mut snapshot)?;
                best = Some((val_loss, epoch, snapshot));
            } else if let Some((_, best_epoch, _)) = &best {
                if self.config.patience > 0 && epoch - best_epoch >= self.config.patience {
                    info!(epoch, best_epoch, "验证损失{}轮未下降，提前停止", self.config.patience);
                    break;
                }
            }
        }

        let epochs_run = train_losses.len();
        let best_epoch = match best {
            Some((best_loss, best_epoch, snapshot)) => {
                self.graph.read_params(snapshot.as_slice())?;
                debug!(best_epoch, best_loss, "已恢复验证损失最低时的参数");
                best_epoch
            }
            None => epochs_run,
        };

        let report = TrainReport {
            epochs_run,
            train_losses,
            val_losses,
            best_epoch,
            train_accuracy: self.evaluate(&self.dataset.train_mask().to_vec())?,
            val_accuracy: self.evaluate(&self.dataset.val_mask().to_vec())?,
            test_accuracy: self.evaluate(&self.dataset.test_mask().to_vec())?,
        };
        info!(
            epochs = report.epochs_run,
            best_epoch = report.best_epoch,
            train_acc = report.train_accuracy,
            val_acc = report.val_accuracy,
            test_acc = report.test_accuracy,
            "训练结束"
        );
        Ok(report)
    }

    fn log_epoch(&self, epoch: usize, loss: f32, val_loss: Option<f32>) -> Result<(), TrainError> {
        let interval = self.config.log_interval;
        let is_last = epoch == self.config.epochs;
        if !(is_last || (interval > 0 && epoch % interval == 0)) {
            return Ok(());
        }
        match val_loss {
            Some(val_loss) => {
                let logits = self.current_logits()?;
                let val_acc = accuracy(logits, self.dataset.labels(), self.dataset.val_mask());
                info!(epoch, loss, val_loss, val_acc, "训练中");
            }
            None => info!(epoch, loss, "训练中"),
        }
        Ok(())
    }

    /// 当前参数下的logits，[N, num_classes]
    pub fn logits(&mut self) -> Result<Tensor, TrainError> {
        self.graph.forward_node(self.logits)?;
        Ok(self.current_logits()?.clone())
    }

    /// `mask`上的分类准确率（只做前向传播）
    pub fn evaluate(&mut self, mask: &[usize]) -> Result<f32, TrainError> {
        let num_nodes = self.dataset.num_nodes();
        if let Some(&node) = mask.iter().find(|&&node| node >= num_nodes) {
            return Err(DataError::IndexOutOfBounds {
                index: node,
                len: num_nodes,
            }
            .into());
        }
        self.graph.forward_node(self.logits)?;
        Ok(accuracy(self.current_logits()?, self.dataset.labels(), mask))
    }

    /// 每个节点的预测类别
    pub fn predict(&mut self) -> Result<Vec<usize>, TrainError> {
        Ok(self.logits()?.argmax_rows())
    }

    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainError> {
        Ok(self.graph.save_params(path)?)
    }

    /// 加载参数，返回成功加载的参数个数
    pub fn load_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, TrainError> {
        Ok(self.graph.load_params(path)?)
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn model(&self) -> &GatModel {
        &self.model
    }

    fn current_logits(&self) -> Result<&Tensor, TrainError> {
        self.graph.get_node_value(self.logits)?.ok_or_else(|| {
            TrainError::Config("logits尚未计算，请先执行前向传播".to_string())
        })
    }

    fn scalar(&self, id: NodeId) -> Result<f32, TrainError> {
        let value = self.graph.get_node_value(id)?.and_then(Tensor::number);
        value.ok_or_else(|| TrainError::Config("损失节点没有标量值".to_string()))
    }
}

/// 模型配置中的宽度为0时取数据集的值，非0时须与数据集一致
fn fill_dimension(field: &str, value: &mut usize, actual: usize) -> Result<(), TrainError> {
    if *value == 0 {
        *value = actual;
    } else if *value != actual {
        return Err(TrainError::Config(format!(
            "模型配置的{field}为{value}，但数据集为{actual}"
        )));
    }
    Ok(())
}
