//! Fundamental types shared by the CUSF annotation tools: token references,
//! the closed label grammar, and the frame/argument model.

pub mod ids;
pub mod labels;
pub mod model;

// Re-export core types for convenience
pub use ids::{SentenceId, TokenRef};
pub use labels::{
    check_dep_label, check_frame_label, leading_frame, parse_frame_label, simplify, split_label,
    validate_dep_label, Aspect, FrameKind, FrameLabel, LabelError, Mode, RoleRule,
};
pub use model::{Argument, ExpectedLink, Frame};
