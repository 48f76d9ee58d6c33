pub mod csv_format;
