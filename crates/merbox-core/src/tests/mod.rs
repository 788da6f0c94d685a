mod config;
mod samples;
mod viewport;
