pub mod duration_seconds;
pub mod prefixed_hex_or_bytes_vec;
pub mod prefixed_hex_quantity;
pub mod string_or_native;
