#![allow(dead_code)]

pub mod api_app;
pub mod gateway;
pub mod http;
