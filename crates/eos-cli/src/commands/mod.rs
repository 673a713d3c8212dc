pub mod evaluate;
pub mod list;
