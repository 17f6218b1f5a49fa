pub mod accents;
pub mod assign;
pub mod contrast;
pub mod detect;
pub mod extract;
pub mod foreground;
pub mod muted;
pub mod seed;
pub mod semantic;
pub mod surface;
