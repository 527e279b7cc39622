pub mod action_tests;
pub mod completion_tests;
