pub mod design_delete;
pub mod design_upload;
pub mod file_delivery;
pub mod my_designs;
pub mod review;
