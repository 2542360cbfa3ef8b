pub mod delivery;
pub mod event;
pub mod extraction;
pub mod key;
pub mod language;
pub mod processor; // Translation delivery orchestrator
pub mod render;
pub mod storage;
pub mod translation;
