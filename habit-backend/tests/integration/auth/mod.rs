pub mod session_tests;
