#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod export_data;
pub mod gps_processor;
pub mod import_data;
mod logs;
pub mod main_db;
pub mod map_renderer;
pub mod recorder;
pub mod route;
pub mod route_segmenter;
pub mod storage;
pub mod tracker;
mod utils;
