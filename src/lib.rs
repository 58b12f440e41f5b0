pub mod app;
pub mod dashboard;
pub mod db;
pub mod ingest;
pub mod monitor;
pub mod realtime;
pub mod sensor;
