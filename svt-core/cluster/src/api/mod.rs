//! 集群 API 模块

pub mod cluster;
pub mod image;
pub mod pod;
pub mod snapshot;
pub mod vm;
pub mod volume;
