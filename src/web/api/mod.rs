pub mod default;
pub mod detect;
pub mod log;
pub mod misc;
pub mod track;
pub mod verify;
