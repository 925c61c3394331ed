/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 参数的保存与加载（save_params/load_params）
 *
 * 文件格式：4字节魔数 + 4字节小端版本号 + bincode编码的`Vec<ParamRecord>`。
 * 参数按节点名匹配，因此只要用相同的配置重新建图即可加载。
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Graph, GraphError};
use crate::tensor::Tensor;

#[derive(Serialize, Deserialize)]
struct ParamRecord {
    name: String,
    value: Tensor,
}

impl Graph {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"OGPR";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 保存所有可训练参数到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let file = File::create(path.as_ref())
            .map_err(|e| GraphError::Serialization(format!("无法创建参数文件: {e}")))?;
        let mut writer = BufWriter::new(file);
        let count = self.write_params(&mut writer)?;
        writer
            .flush()
            .map_err(|e| GraphError::Serialization(format!("刷新缓冲区失败: {e}")))?;
        info!(path = %path.as_ref().display(), count, "参数已保存");
        Ok(())
    }

    /// 从二进制文件加载参数，返回成功加载的参数个数
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, GraphError> {
        let file = File::open(path.as_ref())
            .map_err(|e| GraphError::Serialization(format!("无法打开参数文件: {e}")))?;
        let count = self.read_params(BufReader::new(file))?;
        info!(path = %path.as_ref().display(), count, "参数已加载");
        Ok(count)
    }

    /// 把所有参数写入`writer`，返回写入的参数个数
    pub fn write_params<W: Write>(&self, mut writer: W) -> Result<usize, GraphError> {
        let records = self
            .get_trainable_nodes()
            .into_iter()
            .map(|id| {
                let node = self.get_node(id)?;
                let value = node
                    .value()
                    .cloned()
                    .ok_or_else(|| GraphError::Serialization(format!("参数{node}没有值")))?;
                Ok(ParamRecord {
                    name: node.name().to_string(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        writer
            .write_all(Self::PARAMS_MAGIC)
            .map_err(|e| GraphError::Serialization(format!("写入魔数失败: {e}")))?;
        writer
            .write_all(&Self::PARAMS_VERSION.to_le_bytes())
            .map_err(|e| GraphError::Serialization(format!("写入版本失败: {e}")))?;
        bincode::serialize_into(&mut writer, &records)
            .map_err(|e| GraphError::Serialization(format!("写入参数失败: {e}")))?;
        Ok(records.len())
    }

    /// 从`reader`读取参数并按名称赋值，返回成功赋值的参数个数
    ///
    /// 文件中存在而图中没有的参数会被忽略（并记录警告）；形状不符则报错。
    pub fn read_params<R: Read>(&mut self, mut reader: R) -> Result<usize, GraphError> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| GraphError::Serialization(format!("读取魔数失败: {e}")))?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(GraphError::Serialization(
                "无效的参数文件：请确保使用save_params()保存的文件".to_string(),
            ));
        }

        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| GraphError::Serialization(format!("读取版本失败: {e}")))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != Self::PARAMS_VERSION {
            return Err(GraphError::Serialization(format!(
                "不支持的参数文件版本: {version}"
            )));
        }

        let records: Vec<ParamRecord> = bincode::deserialize_from(&mut reader)
            .map_err(|e| GraphError::Serialization(format!("读取参数失败: {e}")))?;

        let name_to_id = self
            .get_trainable_nodes()
            .into_iter()
            .map(|id| Ok((self.get_node_name(id)?.to_string(), id)))
            .collect::<Result<HashMap<_, _>, GraphError>>()?;

        // 先逐一核对形状，全部通过后再赋值，失败时图中参数保持不变
        let mut matched = Vec::with_capacity(records.len());
        for record in records {
            let Some(&id) = name_to_id.get(&record.name) else {
                warn!(name = %record.name, "图中没有同名参数，已忽略");
                continue;
            };
            let expected = self.get_node_shape(id)?;
            if record.value.shape() != expected {
                return Err(GraphError::ShapeMismatch {
                    expected: expected.to_vec(),
                    got: record.value.shape().to_vec(),
                    message: format!("参数文件中{}的形状与图中不一致", record.name),
                });
            }
            matched.push((id, record.value));
        }

        let loaded = matched.len();
        for (id, value) in matched {
            self.set_node_value(id, Some(&value))?;
        }
        Ok(loaded)
    }
}
