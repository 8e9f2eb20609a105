//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批订单的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用与整条流水线
//! - 管理应用生命周期（下载 CSV、打开浏览器、运行）
//! - 关闭弹窗、读取型号表、加载并预检所有订单
//! - 打包回执、输出全局统计信息
//!
//! ### `order_processor` - 订单循环
//! - 按 CSV 顺序逐张处理订单
//! - 创建并复用 OrderFlow
//! - 第一张失败的订单会终止整个循环
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (整条流水线)
//!     ↓
//! order_processor (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单张订单)
//!     ↓
//! services (能力层：表单 / 型号 / 回执 / 归档)
//!     ↓
//! infrastructure (基础设施：OrderSurface)
//! ```
//!
//! 只有编排层持有 Browser；订单之间共用同一个页面，所以只能串行。

pub mod batch_processor;
pub mod order_processor;

pub use batch_processor::{run_pipeline, App, RunSummary};
pub use order_processor::{process_orders, OrderStats};
