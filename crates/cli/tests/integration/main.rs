mod common;
mod convert_tests;
mod query_tests;
