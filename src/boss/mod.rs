//! Boss body parts
//!
//! Bosses are trees of body parts kept in a [`BodyPartTree`] arena:
//! - leaves carry bounding lines, a colour animation and a destroyed flag
//! - weakpoints are leaves with life that the ball can wear down
//! - composites group children and forward every operation to them
//!
//! [`ShieldRing`] builds a shielded core on top of the tree.

pub mod anim;
pub mod events;
pub mod part;
pub mod shield;
pub mod tree;

pub use anim::{Lerpable, MultiLerp};
pub use events::{BodyPartEvent, EventSink, NullSink};
pub use part::{LeafPart, PartId, PartKind, WeakpointState};
pub use shield::{ShieldRing, Side};
pub use tree::BodyPartTree;
