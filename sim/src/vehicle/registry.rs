use std::collections::BTreeMap;

use bevy_ecs::resource::Resource;
use bevy_log::debug;

use super::Vehicle;

/// Named subsets of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleGroup {
    Ship,
    Boats,
    /// Boats chasing the ship that have not sunk
    Attacking,
    Sinking,
}

impl VehicleGroup {
    /// Whether `vehicle` belongs to this group.
    pub fn contains(self, vehicle: &Vehicle) -> bool {
        match self {
            VehicleGroup::Ship => vehicle.is_ship(),
            VehicleGroup::Boats => vehicle.is_boat(),
            VehicleGroup::Attacking => vehicle.is_boat() && vehicle.is_attacking(),
            VehicleGroup::Sinking => vehicle.is_sunk(),
        }
    }
}

/// All live vehicles, keyed by label. Ordered by label so a seeded session
/// visits vehicles in the same order every run.
#[derive(Resource, Debug, Default, Clone)]
pub struct VehicleRegistry {
    vehicles: BTreeMap<String, Vehicle>,
}

impl VehicleRegistry {
    /// Insert a vehicle, replacing any previous one with the same label.
    pub fn insert(&mut self, vehicle: Vehicle) -> Option<Vehicle> {
        self.vehicles.insert(vehicle.label.clone(), vehicle)
    }

    pub fn get(&self, label: &str) -> Option<&Vehicle> {
        self.vehicles.get(label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(label)
    }

    /// Remove every listed label in a single pass and return what was removed.
    pub fn remove_batch(&mut self, labels: &[String]) -> Vec<Vehicle> {
        if labels.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::with_capacity(labels.len());
        for label in labels {
            if let Some(vehicle) = self.vehicles.remove(label) {
                removed.push(vehicle);
            }
        }
        debug!("Removed {} vehicles from the registry", removed.len());
        removed
    }

    /// Vehicles in `group`, ordered by label.
    pub fn group(&self, group: VehicleGroup) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values().filter(move |vehicle| group.contains(vehicle))
    }

    pub fn group_mut(&mut self, group: VehicleGroup) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles
            .values_mut()
            .filter(move |vehicle| group.contains(vehicle))
    }

    /// Labels of the vehicles in `group`.
    pub fn labels_in(&self, group: VehicleGroup) -> Vec<String> {
        self.group(group).map(|vehicle| vehicle.label.clone()).collect()
    }

    pub fn ship(&self) -> Option<&Vehicle> {
        self.group(VehicleGroup::Ship).next()
    }

    pub fn ship_mut(&mut self) -> Option<&mut Vehicle> {
        self.group_mut(VehicleGroup::Ship).next()
    }

    /// True while some boat is still chasing the ship.
    pub fn any_attacking(&self) -> bool {
        self.group(VehicleGroup::Attacking).next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.values_mut()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
