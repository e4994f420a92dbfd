//! # Clinic Core
//!
//! 诊所档案系统的核心模块，提供档案数据模型、错误定义、时钟抽象和通用工具。

pub mod clock;
pub mod error;
pub mod models;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ClinicError, Result};
pub use models::*;
