pub mod line;
pub mod section;
pub mod station;

#[cfg(test)]
pub(crate) mod test_utils;
