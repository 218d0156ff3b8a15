use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for {field}: {value}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Role {
    Admin => "admin",
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(TimeOfDay {
    Am => "am",
    Pm => "pm",
});

impl Role {
    /// Case-insensitive parse of the role literal carried in URLs.
    pub fn parse_literal(raw: &str) -> Result<Self, ParseEnumError> {
        raw.trim().to_ascii_lowercase().parse()
    }
}

impl TimeOfDay {
    /// AM is any start hour before noon.
    pub fn contains_hour(self, hour: u32) -> bool {
        match self {
            Self::Am => hour < 12,
            Self::Pm => hour >= 12,
        }
    }
}

/// Appointment lifecycle. Serialized as `0` / `1` on the wire and in the
/// database. Transitions only go Scheduled → Completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
}

impl AppointmentStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Scheduled => 0,
            Self::Completed => 1,
        }
    }

    /// `past` and `completed` select Completed; every other condition selects Scheduled.
    pub fn from_condition(condition: &str) -> Self {
        let c = condition.trim();
        if c.eq_ignore_ascii_case("past") || c.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::Scheduled
        }
    }
}

impl From<AppointmentStatus> for u8 {
    fn from(status: AppointmentStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for AppointmentStatus {
    type Error = ParseEnumError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Scheduled),
            1 => Ok(Self::Completed),
            other => Err(ParseEnumError {
                field: "AppointmentStatus",
                value: other.to_string(),
            }),
        }
    }
}
