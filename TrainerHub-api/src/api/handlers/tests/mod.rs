mod support;

mod auth_test;
mod functions_test;
mod health_test;
mod trainer_test;
