pub mod bitlist;
pub mod fee;
pub mod misc;

mod error;
