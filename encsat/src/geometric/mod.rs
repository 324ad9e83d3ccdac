pub mod category;
pub mod chart;
pub mod collection;
pub mod matcher;
