use std::collections::HashSet;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::models::{RiskLevel, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("zone not found: {name}")]
pub struct ZoneNotFound {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate zone name: {0}")]
    DuplicateName(String),
    #[error("zone {name} has pollen count {pollen_count} outside 0..=100")]
    PollenOutOfRange { name: String, pollen_count: u8 },
    #[error("zone {name} is authored as {authored:?} but pollen count {pollen_count} bands as {banded:?}")]
    InconsistentRisk {
        name: String,
        authored: RiskLevel,
        banded: RiskLevel,
        pollen_count: u8,
    },
}

static GLOBAL: Lazy<ZoneRegistry> = Lazy::new(|| {
    ZoneRegistry::from_zones(cusco_seed()).expect("cusco seed zones satisfy registry invariants")
});

/// Read-only catalog of zones, kept in insertion order.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    /// Validates and takes ownership of `zones`.
    ///
    /// Names must be unique, pollen counts must fall in `0..=100`, and each
    /// authored risk level must agree with [`RiskLevel::from_pollen_count`].
    pub fn from_zones(zones: Vec<Zone>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();

        for zone in &zones {
            if !seen.insert(zone.name.as_str()) {
                return Err(RegistryError::DuplicateName(zone.name.clone()));
            }

            if zone.pollen_count > 100 {
                return Err(RegistryError::PollenOutOfRange {
                    name: zone.name.clone(),
                    pollen_count: zone.pollen_count,
                });
            }

            let banded = RiskLevel::from_pollen_count(zone.pollen_count);
            if banded != zone.risk_level {
                return Err(RegistryError::InconsistentRisk {
                    name: zone.name.clone(),
                    authored: zone.risk_level,
                    banded,
                    pollen_count: zone.pollen_count,
                });
            }
        }

        Ok(Self { zones })
    }

    /// The process-wide seeded registry.
    pub fn global() -> &'static ZoneRegistry {
        &GLOBAL
    }

    pub fn list_zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get_zone(&self, name: &str) -> Result<&Zone, ZoneNotFound> {
        self.zones
            .iter()
            .find(|zone| zone.name == name)
            .ok_or_else(|| ZoneNotFound {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

pub fn cusco_seed() -> Vec<Zone> {
    vec![
        Zone::new(
            "Historic Center",
            (-13.5183, -71.9781),
            RiskLevel::High,
            88,
            "High tourist density + eucalyptus flowering",
        ),
        Zone::new(
            "San Pedro Market",
            (-13.5320, -71.9675),
            RiskLevel::High,
            92,
            "Market area + high pollution",
        ),
        Zone::new(
            "Wanchaq",
            (-13.5097, -71.9925),
            RiskLevel::Low,
            25,
            "Residential area + low vegetation",
        ),
        Zone::new(
            "San Blas",
            (-13.5250, -71.9810),
            RiskLevel::Medium,
            65,
            "Artisan area + moderate vegetation",
        ),
        Zone::new(
            "Sacsayhuamán",
            (-13.4886, -71.9720),
            RiskLevel::Low,
            30,
            "Archaeological site + open areas",
        ),
    ]
}
