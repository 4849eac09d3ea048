mod common;
mod pillars;
mod service;
