pub mod controller;
pub mod result;
