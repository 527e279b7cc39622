pub mod profile_tests;
