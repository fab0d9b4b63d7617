mod common;
mod listing;
mod service;
