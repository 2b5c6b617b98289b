pub mod events;
pub mod handler;
pub mod kinetic;

pub use events::{Action, InputEvent, MapEvent};
pub use handler::{EventCallback, EventManager};
pub use kinetic::{Kinetic, KineticConfig, KineticMove};
