//! Chime Core
//!
//! Foundational primitives shared by the Chime clock control:
//!
//! - **Colors and brushes**: RGBA colors, solid and gradient paints
//! - **Update events**: the notification kinds a renderer reacts to
//! - **Listener lists**: copy-on-iterate observer registries
//! - **Dispatch**: handing work to the thread that owns a control
//!
//! # Example
//!
//! ```rust
//! use chime_core::{Listeners, UpdateKind};
//!
//! let listeners: Listeners<UpdateKind> = Listeners::new();
//! let id = listeners.add(|kind| println!("update: {kind:?}"));
//!
//! listeners.emit(&UpdateKind::Redraw);
//! listeners.remove(id);
//! assert!(listeners.is_empty());
//! ```

pub mod color;
pub mod dispatch;
pub mod events;

pub use color::{Brush, Color, ColorParseError, Gradient, GradientStop};
pub use dispatch::{
    ChannelDispatcher, DispatchQueue, Dispatcher, ImmediateDispatcher, SharedDispatcher, Task,
};
pub use events::{ListenerId, Listeners, UpdateKind};
