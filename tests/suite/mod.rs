mod config;
mod navigation;
mod offline;
