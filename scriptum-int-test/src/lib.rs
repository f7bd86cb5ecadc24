pub mod conformance;
pub mod test_util;
