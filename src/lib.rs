//! Calorie Wizard: a chat bot that walks users through a short
//! questionnaire and reports their daily calorie target.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod images;
pub mod nutrition;
pub mod wizard;
