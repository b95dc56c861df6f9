mod export_tests;
mod run_tests;
