pub mod camera;
pub mod collision;
pub mod handle_session;
pub mod recording;
pub mod session;
pub mod track;
pub mod vehicle;
