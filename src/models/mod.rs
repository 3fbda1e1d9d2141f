pub mod appointment;
pub mod block;
pub mod capacity;
pub mod collaborators;
pub mod recommendation;
pub mod settings;
pub mod totals;
pub mod week;
