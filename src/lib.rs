//! # Robot Order Submit
//!
//! 一个用于在 RobotSpareBin 网站上批量下单的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `OrderSurface` - 页面操作接口（点击、填写、截图、打印）
//! - `PageSurface` - 基于 chromiumoxide 的实现，唯一的 page owner
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张订单
//! - `PartNumberResolver` - 读取型号信息表
//! - `FormSubmitter` - 填表、预览、有限次重试下单
//! - `ReceiptExporter` - 截图、打印回执、嵌入截图
//! - `ReceiptArchiver` - 打包所有回执
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张订单"的完整处理流程
//! - `OrderCtx` - 上下文封装（订单号 + 序号）
//! - `OrderFlow` - 流程编排（填表 → 截图 → 下单 → 回执）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 整条流水线，管理浏览器资源
//! - `orchestrator/order_processor` - 订单循环
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::open_order_surface;
pub use config::{Config, ReceiptCountPolicy};
pub use error::{AppError, AppResult};
pub use infrastructure::{Locator, OrderSurface, PageSurface};
pub use models::{OrderRecord, OrderSource, PartNumberMap, Receipt, ResolvedOrder};
pub use orchestrator::{run_pipeline, App, OrderStats, RunSummary};
pub use services::{ArchiveSummary, ReceiptArchiver};
pub use workflow::{OrderCtx, OrderFlow, OrderOutcome};
