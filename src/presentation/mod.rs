// Presentation layer - local viewer endpoints and the frame loop
pub mod app_state;
pub mod frame_loop;
pub mod handlers;
