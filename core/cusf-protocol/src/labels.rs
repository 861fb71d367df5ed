//! The closed label vocabulary.
//!
//! A frame label part looks like `NAME[-ASPECT][-MODE][-NEG]`, e.g.
//! `POSSESSION-CHANGE-NECESSITY`. Argument labels are either roles of the
//! owning frame or `m-`/`x-` modifier roles, which are valid under any frame
//! as long as some frame declares the role. Both kinds of labels may be
//! compound: parts joined by `||` (disjunction) or `>>` (refinement).

use std::collections::BTreeSet;
use std::sync::OnceLock;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

pub const DISJUNCTION: &str = "||";
pub const REFINEMENT: &str = ">>";

const MODIFIER_PREFIXES: [&str; 2] = ["m-", "x-"];
const NEGATION: &str = "NEG";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("empty label part in '{0}'")]
    EmptyPart(String),
    #[error("unknown frame label '{0}'")]
    UnknownFrame(String),
    #[error("role '{role}' is not licensed by frame '{frame}'")]
    UnknownRole { role: String, frame: String },
    #[error("modifier role '{0}' is not declared by any frame")]
    UnknownModifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Aspect {
    Init,
    Deinit,
    Change,
    Continuation,
}

impl Aspect {
    pub const ALL: [Aspect; 4] = [Aspect::Init, Aspect::Deinit, Aspect::Change, Aspect::Continuation];

    pub fn as_str(self) -> &'static str {
        match self {
            Aspect::Init => "INIT",
            Aspect::Deinit => "DEINIT",
            Aspect::Change => "CHANGE",
            Aspect::Continuation => "CONTINUATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Mode {
    Possibility,
    Necessity,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Possibility, Mode::Necessity];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Possibility => "POSSIBILITY",
            Mode::Necessity => "NECESSITY",
        }
    }
}

/// Which argument roles a frame licenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRule {
    /// A fixed set of roles, independent of aspect.
    Rigid(&'static [&'static str]),
    /// One fixed role plus one role that takes `initial-`/`target-`
    /// (and, if `transitory`, `transitory-`) prefixes depending on aspect.
    Flexible {
        fixed: &'static str,
        varying: &'static str,
        transitory: bool,
    },
}

const fn flexible(fixed: &'static str, varying: &'static str, transitory: bool) -> RoleRule {
    RoleRule::Flexible { fixed, varying, transitory }
}

impl RoleRule {
    /// Is `role` legal for a frame with this rule and the given aspect?
    pub fn allows(&self, role: &str, aspect: Option<Aspect>) -> bool {
        match *self {
            RoleRule::Rigid(roles) => roles.contains(&role),
            RoleRule::Flexible { fixed, varying, transitory } => {
                if role == fixed || role == varying {
                    return true;
                }
                let Some((prefix, rest)) = role.split_once('-') else {
                    return false;
                };
                if rest != varying {
                    return false;
                }
                match prefix {
                    "initial" => matches!(aspect, Some(Aspect::Deinit | Aspect::Change)),
                    "target" => matches!(aspect, Some(Aspect::Init | Aspect::Change)),
                    "transitory" => transitory && aspect == Some(Aspect::Change),
                    _ => false,
                }
            }
        }
    }

    /// Every role this rule can license under some aspect.
    pub fn roles(&self) -> Vec<String> {
        match *self {
            RoleRule::Rigid(roles) => roles.iter().map(|r| r.to_string()).collect(),
            RoleRule::Flexible { fixed, varying, transitory } => {
                let mut roles = vec![
                    fixed.to_string(),
                    varying.to_string(),
                    format!("initial-{varying}"),
                    format!("target-{varying}"),
                ];
                if transitory {
                    roles.push(format!("transitory-{varying}"));
                }
                roles
            }
        }
    }
}

macro_rules! define_frames {
    ($($variant:ident => $name:literal, $rule:expr;)*) => {
        /// The closed set of frame types.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        pub enum FrameKind {
            $($variant,)*
        }

        impl FrameKind {
            pub const ALL: &'static [FrameKind] = &[$(FrameKind::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(FrameKind::$variant => $name,)*
                }
            }

            pub fn rule(self) -> RoleRule {
                match self {
                    $(FrameKind::$variant => $rule,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(FrameKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

use RoleRule::Rigid;

define_frames! {
    Scene => "SCENE", flexible("participant", "scene", true);
    Identification => "IDENTIFICATION", Rigid(&["identified", "identifier"]);
    Rank => "RANK", Rigid(&["has-rank", "rank"]);
    Class => "CLASS", flexible("has-class", "class", false);
    Existence => "EXISTENCE", Rigid(&["exists"]);
    TransformationCreation => "TRANSFORMATION-CREATION", Rigid(&["material", "created"]);
    Reproduction => "REPRODUCTION", Rigid(&["original", "copy"]);
    Quality => "QUALITY", Rigid(&["has-quality", "quality"]);
    State => "STATE", flexible("has-state", "state", false);
    Destruction => "DESTRUCTION", Rigid(&["destroyed"]);
    Experience => "EXPERIENCE", Rigid(&["experiencer", "experienced"]);
    Activity => "ACTIVITY", Rigid(&["is-active", "activity"]);
    Focus => "FOCUS", Rigid(&["has-focus", "focus"]);
    Accompaniment => "ACCOMPANIMENT", Rigid(&["accompanied", "accompanier"]);
    Depictive => "DEPICTIVE", Rigid(&["has-depictive", "depictive"]);
    Attribute => "ATTRIBUTE", Rigid(&["has-attribute", "attribute"]);
    Asset => "ASSET", Rigid(&["has-asset", "asset"]);
    Comparison => "COMPARISON", Rigid(&["compared", "reference"]);
    Concession => "CONCESSION", Rigid(&["asserted", "conceded"]);
    Explanation => "EXPLANATION", Rigid(&["explained", "explanation"]);
    Location => "LOCATION", flexible("has-location", "location", true);
    WrappingWearing => "WRAPPING-WEARING", flexible("worn", "wearer", false);
    AdornmentTarnishment => "ADORNMENT-TARNISHMENT", flexible("ornament", "surface", false);
    Hitting => "HITTING", Rigid(&["hitting", "hit"]);
    Ingestion => "INGESTION", Rigid(&["ingested", "transitory-location", "ingester"]);
    Excretion => "EXCRETION", Rigid(&["excreter", "excreted", "transitory-location"]);
    UnanchoredMotion => "UNANCHORED-MOTION", Rigid(&["mover", "transitory-location"]);
    Means => "MEANS", Rigid(&["has-means", "means"]);
    Message => "MESSAGE", flexible("topic", "content", true);
    PartWhole => "PART-WHOLE", flexible("part", "whole", false);
    Possession => "POSSESSION", flexible("possessed", "possessor", false);
    Quantity => "QUANTITY", Rigid(&["has-quantity", "quantity"]);
    Sending => "SENDING", Rigid(&["sent", "sender"]);
    Sequence => "SEQUENCE", Rigid(&["follows", "followed"]);
    Causation => "CAUSATION", Rigid(&["result", "causer"]);
    Reaction => "REACTION", Rigid(&["reaction", "trigger"]);
    Resultative => "RESULTATIVE", Rigid(&["has-resultative", "resultative"]);
    Condition => "CONDITION", Rigid(&["has-condition", "condition"]);
    Exception => "EXCEPTION", Rigid(&["has-exception", "exception"]);
    SocialRelation => "SOCIAL-RELATION", flexible("has-social-relation", "social-relation", false);
    Time => "TIME", Rigid(&["has-time", "time"]);
}

/// One grammatical frame label part, e.g. `SCENE-CHANGE-NEG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct FrameLabel {
    pub kind: FrameKind,
    pub aspect: Option<Aspect>,
    pub mode: Option<Mode>,
    pub negated: bool,
}

impl FrameLabel {
    pub fn parse(part: &str) -> Result<Self, LabelError> {
        let mut rest = part;

        let negated = match strip_tag(rest, NEGATION) {
            Some(r) => {
                rest = r;
                true
            }
            None => false,
        };
        let mut mode = None;
        for m in Mode::ALL {
            if let Some(r) = strip_tag(rest, m.as_str()) {
                rest = r;
                mode = Some(m);
                break;
            }
        }
        let mut aspect = None;
        for a in Aspect::ALL {
            if let Some(r) = strip_tag(rest, a.as_str()) {
                rest = r;
                aspect = Some(a);
                break;
            }
        }

        let kind = FrameKind::from_name(rest)
            .ok_or_else(|| LabelError::UnknownFrame(part.to_string()))?;
        Ok(Self { kind, aspect, mode, negated })
    }
}

fn strip_tag<'a>(label: &'a str, tag: &str) -> Option<&'a str> {
    label.strip_suffix(tag)?.strip_suffix('-')
}

/// Splits a compound label into its parts. The empty label has no parts.
pub fn split_label(label: &str) -> Vec<&str> {
    if label.is_empty() {
        return Vec::new();
    }
    label
        .split(DISJUNCTION)
        .flat_map(|part| part.split(REFINEMENT))
        .collect()
}

/// Parses every part of a (possibly compound) frame label.
pub fn parse_frame_label(label: &str) -> Result<Vec<FrameLabel>, LabelError> {
    let parts = split_label(label);
    if parts.is_empty() {
        return Err(LabelError::EmptyPart(label.to_string()));
    }
    parts
        .into_iter()
        .map(|part| {
            if part.is_empty() {
                Err(LabelError::EmptyPart(label.to_string()))
            } else {
                FrameLabel::parse(part)
            }
        })
        .collect()
}

pub fn check_frame_label(label: &str) -> bool {
    parse_frame_label(label).is_ok()
}

/// The frame kind of the first part of a frame label, if it parses.
pub fn leading_frame(label: &str) -> Option<FrameKind> {
    let first = split_label(label).into_iter().next()?;
    FrameLabel::parse(first).ok().map(|f| f.kind)
}

/// Union of every role licensed by some frame.
fn all_roles() -> &'static BTreeSet<String> {
    static ROLES: OnceLock<BTreeSet<String>> = OnceLock::new();
    ROLES.get_or_init(|| {
        FrameKind::ALL
            .iter()
            .flat_map(|kind| kind.rule().roles())
            .collect()
    })
}

fn strip_modifier(role: &str) -> Option<&str> {
    MODIFIER_PREFIXES
        .iter()
        .find_map(|prefix| role.strip_prefix(prefix))
}

/// Validates an argument label against the label of the frame that owns it.
///
/// Every part of `dep` must be a modifier role or a role licensed by at
/// least one part of `frame`.
pub fn validate_dep_label(dep: &str, frame: &str) -> Result<(), LabelError> {
    let frames = parse_frame_label(frame)?;
    let parts = split_label(dep);
    if parts.is_empty() {
        return Err(LabelError::EmptyPart(dep.to_string()));
    }
    for part in parts {
        if part.is_empty() {
            return Err(LabelError::EmptyPart(dep.to_string()));
        }
        if let Some(role) = strip_modifier(part) {
            if !all_roles().contains(role) {
                return Err(LabelError::UnknownModifier(part.to_string()));
            }
            continue;
        }
        if !frames.iter().any(|f| f.kind.rule().allows(part, f.aspect)) {
            return Err(LabelError::UnknownRole {
                role: part.to_string(),
                frame: frame.to_string(),
            });
        }
    }
    Ok(())
}

pub fn check_dep_label(dep: &str, frame: &str) -> bool {
    validate_dep_label(dep, frame).is_ok()
}

/// Reduces a label part to its coarse category for lenient comparison:
/// frame labels lose aspect, mode and polarity; roles lose modifier and
/// aspect prefixes.
pub fn simplify(part: &str) -> String {
    if let Ok(frame) = FrameLabel::parse(part) {
        return frame.kind.name().to_string();
    }
    let role = strip_modifier(part).unwrap_or(part);
    ["initial-", "transitory-", "target-"]
        .iter()
        .find_map(|prefix| role.strip_prefix(prefix))
        .unwrap_or(role)
        .to_string()
}
