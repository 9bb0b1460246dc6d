pub mod judge;
pub mod pool;
pub mod score;
pub mod selector;
pub mod timer;
