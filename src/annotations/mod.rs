pub mod box_record;
pub mod class_catalog;
pub mod codec;
pub mod detection_set;
