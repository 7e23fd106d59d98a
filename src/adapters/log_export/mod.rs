pub mod json_log_exporter;
