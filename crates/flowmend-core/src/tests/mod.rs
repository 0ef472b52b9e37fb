mod cache;
mod config;
mod ids;
mod index;
