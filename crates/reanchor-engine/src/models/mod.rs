pub mod anchor;
pub mod anchor_object;

pub use anchor::{Anchor, AnchorType, Position};
pub use anchor_object::{
    AnchorId, AnchorObject, FileIdentity, PotentialAnchorObject, ReasonSuggested, SurroundingCode,
};
