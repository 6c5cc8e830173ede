mod failure_test;
mod hub_test;
mod postgres_test;
mod reference_test;
mod run_test;
