//! dashgrid - 可编辑分页表格核心库
//!
//! 模块结构：
//! - models: 数据模型（GridModel, ChangeSet, CellValue）
//! - kernel: 交互核心（Store, DualViewportController, PagingCoordinator, AsyncTask）
//! - kernel::services: 端口与适配器（PageSource, ChangeSink, TokioExecutor, Settings）

pub mod kernel;
pub mod models;
