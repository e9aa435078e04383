pub mod ingest;
pub mod validator;
