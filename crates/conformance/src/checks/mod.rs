pub mod c01_value_round_trip;
pub mod c02_bytes_round_trip;
pub mod c03_file_round_trip;
pub mod c04_stable_encoding;
