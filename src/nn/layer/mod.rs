/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 图注意力层：单头层与多头包装
 */

mod gat;
mod multi_head;

pub use gat::GatLayer;
pub use multi_head::{HeadMerge, MultiHeadGat};
