//! Value types shared by every flat struct

pub mod time;
