use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StorageKey;
use crate::fleet::domain::{Challan, Cluster, Driver, EntityId, Notification, Ride, Vehicle};

/// A persisted record kind bound to its storage namespace.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const KEY: StorageKey;

    fn id(&self) -> &EntityId;
    fn assign_id(&mut self, id: EntityId);
}

macro_rules! impl_record {
    ($($ty:ty => $key:expr),+ $(,)?) => {
        $(
            impl Record for $ty {
                const KEY: StorageKey = $key;

                fn id(&self) -> &EntityId {
                    &self.id
                }

                fn assign_id(&mut self, id: EntityId) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_record! {
    Driver => StorageKey::Drivers,
    Vehicle => StorageKey::Vehicles,
    Ride => StorageKey::Rides,
    Challan => StorageKey::Challans,
    Notification => StorageKey::Notifications,
    Cluster => StorageKey::Clusters,
}
