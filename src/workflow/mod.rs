pub mod batch;
pub mod link;
pub mod submit;
