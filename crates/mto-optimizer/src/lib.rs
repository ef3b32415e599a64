//! # MTO Optimizer
//!
//! 切管選料（單支貪婪選擇，餘料優先）

pub mod cutting;

// Re-export 主要類型
pub use cutting::{recommend, CutRecommendation, GreedyRemnantFirst, StockSelector};
