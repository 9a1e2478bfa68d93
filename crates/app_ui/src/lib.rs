//! FileDesk UI Layer
//!
//! Provides:
//! - egui views for the dashboard, detail view and upload dialog
//! - Document previews
//! - wgpu rendering pipeline
//! - Input handling

pub mod renderer;
pub mod components;
pub mod input;
pub mod theme;

pub use renderer::Renderer;
pub use input::InputHandler;
pub use theme::Theme;
