mod fake_scanner;
mod integration;
