pub mod line_locks;
pub mod line_sections;
pub mod lines;
pub mod section_store;
pub mod stations;
pub mod topology;
