pub mod boundary;
pub mod config;
pub mod cut_search;
pub mod detector;
pub mod export;
pub mod frame_source;
pub mod matcher;
pub mod ocr;
pub mod transition;
