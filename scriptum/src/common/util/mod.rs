mod name_utils;

pub use name_utils::*;
