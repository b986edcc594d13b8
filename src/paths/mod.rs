mod resolve;


pub use resolve::{file_name_without_map, normalize, relative_to, resolve};
