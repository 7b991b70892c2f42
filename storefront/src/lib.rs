pub mod api;
pub mod cart;
pub mod error;
pub mod executable_utils;
pub mod model;
pub mod service;
pub mod shipping;
pub mod storage;
