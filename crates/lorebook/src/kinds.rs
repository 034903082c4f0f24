use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDateTime};
use schemars::JsonSchema;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

/// Canonical token form used for every enumeration lookup: NFKC, no
/// whitespace, lowercase. "Getting Started" and "gettingstarted" compare equal.
pub fn normalize_token(raw: &str) -> String {
    raw.nfkc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raised when a token does not name a member of a closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMember {
    pub value: String,
    pub set: &'static str,
}

impl fmt::Display for UnknownMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value '{}' not found in '{}'", self.value, self.set)
    }
}

impl std::error::Error for UnknownMember {}

/// A closed enumeration decoded from free text.
pub trait ClosedSet: FromStr<Err = UnknownMember> + Copy {
    /// Human readable list of accepted members.
    fn expected() -> String;
}

/// Declares a closed enumeration whose members parse case- and
/// whitespace-insensitively and render as their canonical names.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling written back to disk.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn from_ordinal(ordinal: u64) -> Option<Self> {
                usize::try_from(ordinal).ok().and_then(|idx| Self::ALL.get(idx).copied())
            }
        }

        impl ClosedSet for $name {
            fn expected() -> String {
                format!("one of {}", [$($label),+].join(", "))
            }
        }

        impl FromStr for $name {
            type Err = UnknownMember;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let token = normalize_token(raw);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| normalize_token(member.as_str()) == token)
                    .ok_or_else(|| UnknownMember {
                        value: raw.to_string(),
                        set: stringify!($name),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct MemberVisitor;

                impl Visitor<'_> for MemberVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a member name or ordinal of {}", stringify!($name))
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                        v.parse().map_err(E::custom)
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                        $name::from_ordinal(v).ok_or_else(|| {
                            E::custom(format!("ordinal {v} out of range for {}", stringify!($name)))
                        })
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                        let ordinal = u64::try_from(v).map_err(|_| {
                            E::custom(format!("negative ordinal {v} for {}", stringify!($name)))
                        })?;
                        self.visit_u64(ordinal)
                    }
                }

                deserializer.deserialize_any(MemberVisitor)
            }
        }
    };
}

closed_enum! {
    /// Kinds of document decoded into an [`crate::Article`].
    DocumentType {
        GettingStarted => "GettingStarted",
        Create => "Create",
        Modify => "Modify",
        Remove => "Remove",
        Restore => "Restore",
        Troubleshoot => "Troubleshoot",
        Standard => "Standard",
        Blog => "Blog",
    }
}

closed_enum! {
    /// Recognised type tags that live in the tree but are not articles.
    SkipTag {
        Plan => "plan",
        Test => "test",
        A025 => "a025",
        Rtm => "rtm",
        Install => "install",
        Reference => "reference",
        Procedure => "procedure",
        Stig => "stig",
        Rule => "rule",
    }
}

closed_enum! {
    Difficulty {
        InDevelopment => "InDevelopment",
        Beginner => "Beginner",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
        Professional => "Professional",
    }
}

closed_enum! {
    /// Skillset expected of the reader; doubles as a contributor role.
    Skillset {
        Any => "Any",
        Operator => "Operator",
        Integrator => "Integrator",
        Engineer => "Engineer",
        Architect => "Architect",
    }
}

closed_enum! {
    TrainingFrequency {
        Yearly => "Yearly",
        Quarterly => "Quarterly",
        SemiAnnually => "SemiAnnually",
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::InDevelopment
    }
}

impl Default for Skillset {
    fn default() -> Self {
        Self::Any
    }
}

impl TrainingFrequency {
    /// Length of the staleness window for this frequency.
    pub fn window(self) -> Months {
        match self {
            TrainingFrequency::Yearly => Months::new(12),
            TrainingFrequency::Quarterly => Months::new(3),
            TrainingFrequency::SemiAnnually => Months::new(6),
        }
    }

    /// Oldest `last-trained` value still inside the window ending at `now`.
    pub fn cutoff(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        now.checked_sub_months(self.window())
    }
}
