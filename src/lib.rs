pub mod management;
pub mod utils;
pub mod web;
