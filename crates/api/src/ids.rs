use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use super::error::{ApiError, ApiResult, InvalidIdSnafu};

// All backend ids are plain integers on the wire; the wrappers only keep them from being mixed up.
macro_rules! define_api_id {
    ($name:ident, $id_type:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn parse(raw: &str) -> ApiResult<Self> {
                let parsed = raw.trim().parse::<u64>().context(InvalidIdSnafu {
                    stage: "parse-api-id",
                    id_type: $id_type,
                    raw: raw.to_string(),
                })?;
                Ok(Self(parsed))
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = ApiError;

            fn from_str(raw: &str) -> ApiResult<Self> {
                Self::parse(raw)
            }
        }
    };
}

define_api_id!(ChatId, "chat-id");
define_api_id!(MessageId, "message-id");
define_api_id!(InvitationId, "invitation-id");
define_api_id!(UserId, "user-id");

impl ChatId {
    /// Every chat is opened for exactly one invitation and shares its id.
    pub const fn invitation_id(self) -> InvitationId {
        InvitationId(self.0)
    }
}

impl MessageId {
    /// Cursor value meaning "nothing known yet".
    pub const ORIGIN: Self = Self(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integers() {
        assert_eq!(ChatId::parse(" 42 ").unwrap(), ChatId::new(42));
        assert_eq!("7".parse::<InvitationId>().unwrap(), InvitationId::new(7));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let error = MessageId::parse("abc").unwrap_err();
        assert!(matches!(
            error,
            ApiError::InvalidId {
                id_type: "message-id",
                ..
            }
        ));
    }

    #[test]
    fn chat_maps_onto_its_invitation() {
        assert_eq!(ChatId::new(9).invitation_id(), InvitationId::new(9));
    }
}
