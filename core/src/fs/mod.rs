//! File system access layer: name rules, image filtering, and staged transfers.

pub mod transfer;
mod util;

pub use transfer::{move_verified, write_new};
pub use util::{
    IMAGE_EXTENSIONS, file_name, is_supported_image, modified_time, validate_folder_name,
};
