pub mod camera;
pub mod traffic;
