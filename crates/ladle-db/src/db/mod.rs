pub mod catalog;
pub mod interval;
pub mod recipe;
