//! Strongly typed identifiers for planning and dispatch entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the wrapped UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_id!(
    /// Identifier of a delivery order.
    OrderId
);
define_id!(
    /// Identifier of a vehicle.
    VehicleId
);
define_id!(
    /// Identifier of a driver.
    DriverId
);
define_id!(
    /// Identifier of a depot.
    DepotId
);
define_id!(
    /// Identifier of a persisted route.
    RouteId
);
define_id!(
    /// Identifier of a persisted route stop.
    StopId
);
define_id!(
    /// Identifier of a reassignment log entry.
    ReassignmentId
);

/// Kind of entity referenced by audit entries and transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A delivery order.
    Order,
    /// A stop on a route.
    Stop,
    /// A vehicle route.
    Route,
}

impl EntityKind {
    /// Stable lowercase name used in logs and audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Stop => "stop",
            Self::Route => "route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_serialize_as_bare_uuid() {
        let id = OrderId::from_uuid(Uuid::from_u128(7));
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000007\"");
    }

    #[rstest]
    fn random_ids_differ() {
        assert_ne!(RouteId::random(), RouteId::random());
    }
}
